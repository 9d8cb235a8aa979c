//! Activity and attendance handlers

use super::App;
use crate::args::ActivitySubcommand;
use anyhow::Context;
use mentorhub::core::http::Upload;
use mentorhub::core::models::{Activity, AttendanceType};
use mentorhub::core::panels::{ActivityPanel, WeekStatus};
use mentorhub::warn;
use std::path::PathBuf;

fn print_activity(activity: &Activity, app: &App) {
    println!("[{}] {} {}", activity.id, activity.week, activity.title);
    if activity.image.is_some() {
        println!("     photo: {}", app.image_url(activity.image.as_deref()));
    }
}

fn load_upload(path: Option<&PathBuf>) -> anyhow::Result<Option<Upload>> {
    path.map(|p| Upload::from_path(p).with_context(|| format!("Failed to read {}", p.display())))
        .transpose()
}

/// Applies the absent/makeup lists to the open form
fn apply_marks(panel: &mut ActivityPanel, absent: &[String], makeup: &[String]) {
    let marks = absent
        .iter()
        .map(|sn| (sn, AttendanceType::Absence))
        .chain(makeup.iter().map(|sn| (sn, AttendanceType::Makeup)));
    for (sn, mark) in marks {
        if !panel.set_attendance(sn.trim(), mark) {
            warn!("{} is not on the roster; ignored", sn.trim());
        }
    }
}

/// Dispatch activity subcommands
///
/// # Errors
/// Returns the failed operation; its alert is already raised
pub async fn run(app: &App, group: i64, subcommand: ActivitySubcommand) -> anyhow::Result<()> {
    let mut panel = ActivityPanel::new(group);
    match subcommand {
        ActivitySubcommand::List => {
            let list = panel.load(app).await?;
            if list.is_empty() {
                println!("No activities in group {group}");
            }
            for activity in &list {
                print_activity(activity, app);
            }
        }
        ActivitySubcommand::Show { activity_id } => {
            panel.open_detail(activity_id);
            let draft = panel.open_edit(app, activity_id).await?;
            println!("{} {}\n", draft.week, draft.title);
            println!("{}\n", draft.content);
            for entry in &draft.attendances {
                println!("  {:<12} {:<10} {}", entry.student_number, entry.name, entry.attendance_type);
            }
            if let Some(activity) = app.store().activity(activity_id) {
                if activity.image.is_some() {
                    println!("\nphoto: {}", app.image_url(activity.image.as_deref()));
                }
            }
        }
        ActivitySubcommand::Create {
            title,
            content,
            week,
            absent,
            makeup,
            image,
        } => {
            let upload = load_upload(image.as_ref())?;
            panel.open_new(app).await?;
            if let Some(draft) = panel.draft_mut() {
                draft.title = title;
                draft.content = content;
            }
            panel.set_week(app, &week).await?;
            apply_marks(&mut panel, &absent, &makeup);
            panel.set_image(upload);
            let list = panel.submit(app).await?;
            println!("✓ Activity recorded ({} activities in group {group})", list.len());
        }
        ActivitySubcommand::Update {
            activity_id,
            title,
            content,
            week,
            absent,
            makeup,
            image,
        } => {
            let upload = load_upload(image.as_ref())?;
            panel.open_edit(app, activity_id).await?;
            if let Some(draft) = panel.draft_mut() {
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(content) = content {
                    draft.content = content;
                }
            }
            if let Some(week) = week {
                panel.set_week(app, &week).await?;
            }
            apply_marks(&mut panel, &absent, &makeup);
            panel.set_image(upload);
            panel.submit(app).await?;
            println!("✓ Activity {activity_id} updated");
        }
        ActivitySubcommand::Delete { activity_id } => {
            panel.delete(app, activity_id).await?;
            println!("✓ Activity {activity_id} deleted");
        }
        ActivitySubcommand::Attendance => {
            panel.load(app).await?;
            let Some(summary) = panel.my_attendance(app) else {
                println!("No student number on record; sign in first");
                return Ok(());
            };
            for (week, status) in &summary.weeks {
                let label = match status {
                    WeekStatus::Attended(AttendanceType::Makeup) => "made up",
                    WeekStatus::Attended(_) => "present",
                    WeekStatus::Absent => "absent",
                    WeekStatus::NoRecord => "no record",
                };
                println!("  {week:<6} {label}");
            }
            match summary.rate() {
                Some(rate) => println!(
                    "\n{} of {} weeks, {rate}%",
                    summary.attended,
                    summary.total_weeks()
                ),
                None => println!("\nNo activities yet"),
            }
        }
        ActivitySubcommand::Weeks => {
            let weeks = panel.load_all_weeks(app).await?;
            for week in weeks {
                let absent: Vec<&str> = week
                    .attendances
                    .iter()
                    .filter(|a| !a.attendance_type.counts_as_attended())
                    .map(|a| a.student_number.as_str())
                    .collect();
                println!(
                    "  {:<6} {} recorded, absent: {}",
                    week.week,
                    week.attendances.len(),
                    if absent.is_empty() { "-".to_string() } else { absent.join(", ") }
                );
            }
        }
    }
    Ok(())
}
