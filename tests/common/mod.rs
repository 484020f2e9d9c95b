#![allow(dead_code)]

use std::fmt::Write;

use rosu_droid_pp::Beatmap;

pub const FIXTURE: &str = "./resources/droid_fixture.osu";

const HEADER: &str = "osu file format v14

[General]
StackLeniency: 0.7
Mode: 0

[Difficulty]
HPDrainRate:5
CircleSize:4
OverallDifficulty:8
ApproachRate:9
SliderMultiplier:1.6
SliderTickRate:1

[TimingPoints]
0,300,4,2,0,60,1,0

[HitObjects]
";

fn parse(hit_objects: &str) -> Beatmap {
    format!("{HEADER}{hit_objects}").parse().unwrap()
}

/// Circles alternating between two points, `spacing` milliseconds apart.
pub fn stream(n: usize, spacing: f64) -> Beatmap {
    let mut hit_objects = String::new();

    for i in 0..n {
        let x = if i % 2 == 0 { 160 } else { 352 };
        let time = 1000.0 + i as f64 * spacing;

        let _ = writeln!(hit_objects, "{x},192,{time},1,0,0:0:0:0:");
    }

    parse(&hit_objects)
}

/// Jumps, sliders, a short burst, and a spinner.
pub fn mixed() -> Beatmap {
    let mut hit_objects = String::new();
    let mut time = 1000;

    for i in 0..24 {
        let (x, y) = match i % 4 {
            0 => (64, 64),
            1 => (448, 64),
            2 => (448, 320),
            _ => (64, 320),
        };

        let _ = writeln!(hit_objects, "{x},{y},{time},1,0,0:0:0:0:");
        time += 300;
    }

    for i in 0..16 {
        let x = 96 + (i % 4) * 80;
        let repeats = 1 + i % 2;

        let _ = writeln!(
            hit_objects,
            "{x},200,{time},2,0,B|{}:120|{}:200,{repeats},140",
            x + 70,
            x + 140,
        );

        time += 300 * repeats + 300;
    }

    for i in 0..32 {
        let x = 200 + (i % 2) * 60;

        let _ = writeln!(hit_objects, "{x},192,{time},1,0,0:0:0:0:");
        time += 75;
    }

    let _ = writeln!(hit_objects, "256,192,{time},12,0,{},0:0:0:0:", time + 3000);

    parse(&hit_objects)
}

pub fn fixture_exists() -> bool {
    std::path::Path::new(FIXTURE).exists()
}

#[track_caller]
pub fn assert_eq_float(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}
