//! Group detail and membership handlers

use super::{or_dash, App};
use crate::args::GroupSubcommand;
use anyhow::Context;
use mentorhub::core::http::Upload;
use mentorhub::core::panels::{GroupEdit, GroupPanel};

/// Dispatch group subcommands
///
/// # Errors
/// Returns the failed operation; its alert is already raised
pub async fn run(app: &App, group: i64, subcommand: GroupSubcommand) -> anyhow::Result<()> {
    let panel = GroupPanel::new(group);
    match subcommand {
        GroupSubcommand::Show => {
            let role = panel.load(app).await?;
            if let Some(detail) = panel.group(app) {
                println!("{} {}", detail.name, or_dash(detail.generation.as_deref()));
                println!("{}\n", detail.content);
                if let Some(mentor) = &detail.mentor {
                    println!("Mentor: {} ({})", mentor.name, or_dash(Some(&mentor.student_number)));
                }
                println!("Image:  {}", app.image_url(detail.image.as_deref()));
            }
            println!("You:    {role}\n");
            let roster = panel.roster(app);
            println!("Mentees ({}):", roster.len());
            for mentee in roster {
                println!("  {:<12} {}", mentee.student_number, mentee.name);
            }
        }
        GroupSubcommand::Add { student_number } => {
            let roster = panel.add_mentee(app, &student_number).await?;
            println!("✓ Added {} ({} mentees)", student_number.trim(), roster.len());
        }
        GroupSubcommand::Remove { student_number } => {
            let roster = panel.remove_mentee(app, &student_number).await?;
            println!("✓ Removed {} ({} mentees)", student_number.trim(), roster.len());
        }
        GroupSubcommand::Warn { student_number } => {
            let count = panel.warn(app, &student_number).await?;
            println!("✓ Warned {} ({count} so far)", student_number.trim());
        }
        GroupSubcommand::Warnings => {
            let counts = panel.load_warnings(app).await?;
            if counts.is_empty() {
                println!("No warnings");
            }
            for (sn, count) in counts {
                println!("  {sn:<12} {count}");
            }
        }
        GroupSubcommand::Update { name, content, image } => {
            let image = image
                .map(|p| Upload::from_path(&p).with_context(|| format!("Failed to read {}", p.display())))
                .transpose()?;
            let updated = panel.update_group(app, GroupEdit { name, content, image }).await?;
            println!("✓ Group '{}' updated", updated.name);
        }
    }
    Ok(())
}
