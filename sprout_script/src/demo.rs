//! Built-in chapter configurations for the demo playthroughs and tests.
//!
//! These mirror the authored lesson content: clip durations are the real
//! narration lengths rounded to tenths, and the gating knobs match the
//! shipped scene setup.

use crate::chapter::{ChapterOneConfig, ChapterThreeConfig, RulerConfig};
use crate::script::{Line, Script};

fn line(text: &str, clip: &str, duration_secs: f32, post_delay_secs: f32) -> Line {
    let mut built = Line::spoken(text, clip, duration_secs);
    built.post_delay_secs = post_delay_secs;
    built
}

fn chapter_one_script() -> Script {
    let lines = vec![
        line("Hello there! I am Fern, your garden fairy.", "ch1_00_hello", 3.2, 0.0),
        line("Today we are going to grow pea plants together.", "ch1_01_today", 3.0, 0.0),
        line("Everything we need is already on the table.", "ch1_02_table", 2.8, 0.0),
        line("Let me show you each tool before we start.", "ch1_03_tools", 2.9, 0.0),
        line("These are the pots. Each pea gets its own home.", "ch1_04_pots", 3.4, 0.0),
        line("These little seeds will become our pea plants.", "ch1_05_seeds", 3.1, 0.0),
        line("This jar holds compound X, our mystery plant food.", "ch1_06_compound", 3.6, 0.0),
        line("The ruler will help us measure how tall they grow.", "ch1_07_ruler", 3.3, 0.0),
        line("And the watering can keeps everyone happy.", "ch1_08_can", 2.7, 0.0),
        line("That is all of them!", "ch1_09_all", 1.6, 1.0),
        line("Now pick up a seed and drop one into every pot.", "ch1_10_plant", 3.5, 0.0),
        line("Wonderful! All six pots have a seed.", "ch1_11_planted", 2.6, 5.0),
        line("Seeds are thirsty. Grab the watering can.", "ch1_12_thirsty", 2.9, 0.0),
        line("Tip it gently over the pots until the soil is dark.", "ch1_13_tip", 3.7, 0.0),
        line("Perfect. Every pot has had a drink.", "ch1_14_drink", 2.5, 5.0),
        line("Plants need three things: water, light, and food.", "ch1_15_needs", 3.8, 5.0),
        line("We just gave them water, and the sun gives light.", "ch1_16_sun", 3.4, 5.0),
        line("Compound X is the food, and here is our question.", "ch1_17_question", 3.5, 5.0),
        line("Does more compound X make a pea plant grow taller?", "ch1_18_taller", 3.6, 5.0),
        line("To find out, each pot will get a different amount.", "ch1_19_amounts", 3.7, 5.0),
        line("That way we can compare them, fair and square.", "ch1_20_fair", 3.0, 5.0),
        line("Scientists call this an experiment.", "ch1_21_experiment", 2.8, 5.0),
        line("Ours starts today and runs for five whole weeks.", "ch1_22_weeks", 3.3, 5.0),
        line("The plants need time, so we will skip ahead.", "ch1_23_skip", 3.1, 5.0),
        line("Press the button when you are ready to jump forward!", "ch1_24_button", 3.4, 5.0),
    ];
    Script::new(lines).unwrap_or_else(|err| panic!("built-in chapter 1 script invalid: {err}"))
}

fn chapter_three_script() -> Script {
    let lines = vec![
        line("Welcome back to the garden!", "ch3_00_back", 2.2, 0.0),
        line("While you were away, I kept careful notes.", "ch3_01_notes", 2.9, 0.0),
        line("Every week I measured each plant with the ruler.", "ch3_02_measured", 3.3, 0.0),
        line("And every week I wrote the heights on this chart.", "ch3_03_wrote", 3.4, 0.0),
        line("Remember, each pot got a different amount of food.", "ch3_04_remember", 3.5, 0.0),
        line("Pot one got none at all, and pot six got the most.", "ch3_05_range", 3.6, 0.0),
        line("Can you guess which pot grew the tallest plant?", "ch3_06_guess", 3.2, 0.0),
        line("Here is the chart with all five weeks of heights.", "ch3_07_chart", 3.4, 0.0),
        line("Take a good look at how the numbers change.", "ch3_08_look", 2.9, 0.0),
        line("Now refill each pot with its amount of compound X.", "ch3_09_refill", 3.7, 0.0),
        line("You got every single one right. Amazing!", "ch3_10_right", 2.8, 0.0),
        line("Press the five-weeks button and watch them grow!", "ch3_11_five_weeks", 3.3, 0.0),
        line("Five weeks later... look how tall they are!", "ch3_12_grown", 3.1, 0.0),
        line("Some plants shot up and some stayed small.", "ch3_13_spread", 3.0, 0.0),
        line("The food really did change how they grew.", "ch3_14_changed", 2.9, 0.0),
        line("Let us measure the plants one more time.", "ch3_15_measure", 2.8, 0.0),
        line("Slide the ruler up to each plant to read its height.", "ch3_16_slide", 3.6, 0.0),
        line("All measured! Now we can chart our results.", "ch3_17_charted", 3.0, 0.0),
        line("A graph turns our numbers into a picture.", "ch3_18_graph", 2.9, 0.0),
        line("The line graph shows each plant's height over time.", "ch3_19_line", 3.5, 0.0),
        line("The bar graph compares the final heights side by side.", "ch3_20_bar", 3.7, 0.0),
        line("Quiz time! Which graph shows growth week by week?", "ch3_21_quiz", 3.6, 0.0),
        line("That is right, the line graph shows change over time.", "ch3_22_correct", 3.4, 0.0),
        line("Not quite. Look again at the two graphs.", "ch3_23_try_again", 2.8, 0.0),
        line("You did it! You are a real plant scientist now.", "ch3_24_done", 3.3, 0.0),
    ];
    Script::new(lines).unwrap_or_else(|err| panic!("built-in chapter 3 script invalid: {err}"))
}

pub fn chapter_one() -> ChapterOneConfig {
    let mut config = ChapterOneConfig {
        script: chapter_one_script(),
        first_auto_count: 4,
        required_seed_pots: 6,
        seed_tag: "Seed".to_string(),
        water_tag: "WaterCanTip".to_string(),
        next_scene_name: "chapter_3".to_string(),
        scene_switch_delay: 2.0,
        outline_props: vec![
            "outline.pot".to_string(),
            "outline.seed".to_string(),
            "outline.compound_x".to_string(),
            "outline.ruler".to_string(),
            "outline.watering_can".to_string(),
        ],
    };
    config.apply_delay_defaults();
    config
}

pub fn chapter_three() -> ChapterThreeConfig {
    ChapterThreeConfig {
        script: chapter_three_script(),
        default_delay: 5.0,
        pot_required_counts: vec![0, 1, 3, 5, 7, 9],
        dose_required_amounts: vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0],
        compound_tag: "CompoundX".to_string(),
        dose_tag: "X".to_string(),
        pre_growth_wait: 3.0,
        index12_initial_delay: 5.0,
        index12_mid_wait: 3.0,
        fairy_move_duration: 2.0,
        skybox_fade_duration: 2.0,
        ruler: RulerConfig::default(),
    }
}
