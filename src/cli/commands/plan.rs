//! Curriculum and submission handlers

use super::{or_dash, App};
use crate::args::{PlanSubcommand, SubmissionSubcommand};
use mentorhub::core::models::{Plan, Submission};
use mentorhub::core::panels::{CurriculumPanel, GroupPanel, SubmissionState};
use mentorhub::core::validation::{PlanDraft, SubmissionDraft};

fn print_plan(plan: &Plan) {
    let range = match (plan.start_date, plan.end_date) {
        (Some(start), Some(end)) => format!("{start} ~ {end}"),
        _ => "-".to_string(),
    };
    let flag = if plan.has_assignment { " [assignment]" } else { "" };
    let today = chrono::Local::now().date_naive();
    let open = if plan.is_open_on(today) { " (open)" } else { "" };
    println!("[{}] {}{flag}{open}", plan.id, plan.title);
    println!("     {range}  by {}", or_dash(plan.creator_name.as_deref()));
}

/// Dispatch plan subcommands
///
/// # Errors
/// Returns the failed operation; its alert is already raised
pub async fn run(app: &App, group: i64, subcommand: PlanSubcommand) -> anyhow::Result<()> {
    let mut panel = CurriculumPanel::new(group);
    match subcommand {
        PlanSubcommand::List => {
            let plans = panel.load(app).await?;
            if plans.is_empty() {
                println!("No plans in group {group}");
            }
            plans.iter().for_each(print_plan);
        }
        PlanSubcommand::Create {
            title,
            content,
            start,
            end,
            assignment,
        } => {
            let draft = PlanDraft {
                title,
                content,
                has_assignment: assignment,
                start_date: start,
                end_date: end,
            };
            let plans = panel.create_plan(app, &draft).await?;
            println!("✓ Plan created ({} plans in group {group})", plans.len());
        }
        PlanSubcommand::Update {
            plan_id,
            title,
            content,
            start,
            end,
            assignment,
        } => {
            let draft = PlanDraft {
                title,
                content,
                has_assignment: assignment,
                start_date: start,
                end_date: end,
            };
            panel.update_plan(app, plan_id, &draft).await?;
            println!("✓ Plan {plan_id} updated");
        }
        PlanSubcommand::Delete { plan_id } => {
            panel.delete_plan(app, plan_id).await?;
            println!("✓ Plan {plan_id} deleted");
        }
    }
    Ok(())
}

fn print_submission(submission: &Submission, with_password: bool) {
    println!(
        "[{}] {} ({})  {}",
        submission.id,
        or_dash(Some(&submission.name)),
        or_dash(Some(&submission.student_number)),
        submission.content
    );
    if with_password {
        println!("     password: {}", submission.password);
    }
}

/// Dispatch submission subcommands
///
/// # Errors
/// Returns the failed operation; its alert is already raised
pub async fn submission(app: &App, group: i64, subcommand: SubmissionSubcommand) -> anyhow::Result<()> {
    let mut panel = CurriculumPanel::new(group);
    match subcommand {
        SubmissionSubcommand::Show { plan_id } => match panel.load_my_submission(app, plan_id).await? {
            SubmissionState::NoSubmission => println!("Nothing submitted for plan {plan_id}"),
            SubmissionState::Submitted(s) => print_submission(&s, true),
        },
        SubmissionSubcommand::Submit {
            plan_id,
            url,
            password,
        } => {
            let draft = SubmissionDraft {
                content: url,
                password,
            };
            let submitted = panel.submit(app, plan_id, &draft).await?;
            println!("✓ Submitted (#{})", submitted.id);
        }
        SubmissionSubcommand::Edit {
            plan_id,
            url,
            password,
        } => {
            let draft = SubmissionDraft {
                content: url,
                password,
            };
            panel.load_my_submission(app, plan_id).await?;
            let updated = panel.edit_submission(app, plan_id, &draft).await?;
            println!("✓ Submission #{} updated", updated.id);
        }
        SubmissionSubcommand::Delete { plan_id } => {
            panel.load_my_submission(app, plan_id).await?;
            panel.delete_submission(app, plan_id).await?;
            println!("✓ Submission deleted");
        }
        SubmissionSubcommand::Review { plan_id, details } => {
            let roster = GroupPanel::new(group).load_roster(app).await?;
            panel.toggle_submissions(app, plan_id).await?;
            let list = panel.submissions(app, plan_id).unwrap_or_default();
            for s in &list {
                if details {
                    panel.toggle_submission_detail(s.id);
                }
                print_submission(s, panel.is_detail_open(s.id));
            }
            println!(
                "\n{} submitted, {} not submitted",
                list.len(),
                panel.unsubmitted_count(app, plan_id, roster.len())
            );
        }
    }
    Ok(())
}
