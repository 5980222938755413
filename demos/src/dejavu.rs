//! `dejavu` — counts word occurrences read from stdin.
//!
//! Grounded on `examples/original_source/src/soft/uapp/dejavu/dejavu.c`,
//! but the original's dictionary is backed by the project's standalone
//! hash-table tool, which is out of scope here. This demo counts the same
//! way conceptually — skip non-word bytes, lowercase and accumulate a
//! word, look it up, bump or insert — just over a small linear `Vec`
//! instead of a hash table, which is plenty for the handful of distinct
//! words a demo session types in.

use ko6_user_lib::{
    alloc_crate::{string::String, vec::Vec},
    io::{Read as _, stdin},
    println,
};

const WORD_MAX: usize = 32;

fn is_word_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn record(counts: &mut Vec<(String, u32)>, word: &str) {
    if let Some(entry) = counts.iter_mut().find(|(w, _)| w == word) {
        entry.1 += 1;
    } else {
        counts.push((String::from(word), 1));
    }
}

pub extern "C" fn main(_arg: usize) {
    println!("Type any words, an empty read (^D) ends input");

    let mut counts: Vec<(String, u32)> = Vec::new();
    let mut word = [0u8; WORD_MAX];
    let mut word_len = 0usize;
    let mut input = stdin();
    let mut byte = [0u8; 1];

    loop {
        let n = match input.read(&mut byte) {
            Ok(n) => n,
            Err(_) => break,
        };
        if n == 0 {
            break;
        }
        let c = byte[0].to_ascii_lowercase();
        if is_word_byte(c) {
            if word_len < WORD_MAX {
                word[word_len] = c;
                word_len += 1;
            }
        } else if word_len > 0 {
            if let Ok(w) = core::str::from_utf8(&word[..word_len]) {
                record(&mut counts, w);
            }
            word_len = 0;
        }
    }
    if word_len > 0 {
        if let Ok(w) = core::str::from_utf8(&word[..word_len]) {
            record(&mut counts, w);
        }
    }

    println!();
    for (pos, (w, n)) in counts.iter().enumerate() {
        println!("{pos}\t {w} : {n}");
    }
    println!("dejavu: {} distinct word(s)", counts.len());
}
