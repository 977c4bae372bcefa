// src/user_experience.rs
use std::sync::OnceLock;

use regex::Regex;

// `q`, `Q`, `?q`, `>Q`, ...
fn quit_flag() -> &'static Regex {
    static QUIT: OnceLock<Regex> = OnceLock::new();
    QUIT.get_or_init(|| Regex::new(r"^[?>]?[qQ]$").expect("static regex"))
}

// Only the prefixed forms; a file may well be called `q`.
fn prefixed_quit_flag() -> &'static Regex {
    static QUIT: OnceLock<Regex> = OnceLock::new();
    QUIT.get_or_init(|| Regex::new(r"^[?>][qQ]$").expect("static regex"))
}

fn back_flag() -> &'static Regex {
    static BACK: OnceLock<Regex> = OnceLock::new();
    BACK.get_or_init(|| Regex::new(r"^[?>]?[bB]$").expect("static regex"))
}

pub fn is_quit_flag(input: &str) -> bool {
    quit_flag().is_match(input.trim())
}

pub fn is_filename_quit_flag(input: &str) -> bool {
    prefixed_quit_flag().is_match(input.trim())
}

pub fn is_back_flag(input: &str) -> bool {
    back_flag().is_match(input.trim())
}
