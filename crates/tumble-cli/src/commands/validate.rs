//! Catalog validation command

use anyhow::Result;
use std::path::Path;
use tumble_anim::loader::load_catalog_from_file;

pub fn run(catalog: &str, level: Option<u32>) -> Result<()> {
    let catalog = load_catalog_from_file(Path::new(catalog), level)?;

    println!(
        "Catalog '{}': {} action(s) bound{}",
        catalog.model(),
        catalog.len(),
        level.map(|l| format!(" on level {}", l)).unwrap_or_default()
    );
    println!(
        "  {:>6}  {:<16} {:>8} {:>6}  {:<5} {:<5} {:>4}/{:<4} file",
        "action", "name", "frames", "speed", "loop", "sync", "in", "out"
    );

    let mut hard_cut_only = 0;
    for entry in catalog.entries() {
        let info = &entry.info;
        println!(
            "  {:>6}  {:<16} {:>8.2} {:>6.2}  {:<5} {:<5} {:>4}/{:<4} {}",
            entry.action,
            entry.name,
            info.duration_frames,
            info.speed,
            info.looping,
            info.distance_synced,
            info.blend_in_frames,
            info.blend_out_frames,
            entry.curves.body.as_str()
        );
        if !info.can_blend_in() && !info.can_blend_out() {
            hard_cut_only += 1;
        }
    }

    if hard_cut_only > 0 {
        println!("\n  {} action(s) always hard-cut (blend frames <= 1).", hard_cut_only);
    }
    Ok(())
}
