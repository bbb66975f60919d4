use std::process::Command;

use anyhow::{Context, Result};

/// `daterange-common` feature tiers; every other crate has no features.
const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // default
    &["foundation"],
    &["test-utils"],
];

/// Check that each feature tier of the common crate compiles on its own.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} daterange-common feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let is_default = features.is_empty();
        let display_label = if is_default { "default".to_string() } else { joined.clone() };

        println!(
            "\n[{}/{}] cargo check -p daterange-common ({display_label})",
            index + 1,
            FEATURE_COMBINATIONS.len()
        );

        let mut command = Command::new("cargo");
        command.args(["check", "-p", "daterange-common", "--no-default-features"]);
        if !is_default {
            command.arg("--features").arg(&joined);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{display_label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{display_label}' failed to compile");
        }

        println!("Features '{display_label}' compiled successfully");
    }

    println!("\nAll {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
