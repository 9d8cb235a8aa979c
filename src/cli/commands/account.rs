//! Auth, profile, announcement, approval and theme handlers

use super::{or_dash, App};
use crate::args::{AnnouncementSubcommand, ApprovalSubcommand, AuthSubcommand, ThemeArg};
use mentorhub::core::models::RegisterRequest;
use mentorhub::core::panels::account;

/// Dispatch auth subcommands
///
/// # Errors
/// Returns the failed operation; its alert is already raised
pub async fn auth(app: &App, subcommand: AuthSubcommand) -> anyhow::Result<()> {
    match subcommand {
        AuthSubcommand::Login { email, password } => {
            let user = account::login(app, &email, &password).await?;
            println!("✓ Signed in as {} ({}, {})", user.name, user.student_number, user.role);
            if let Some(exp) = user.expires_at {
                println!("  token expires {}", exp.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        AuthSubcommand::Logout => {
            account::logout(app);
            println!("✓ Signed out");
        }
        AuthSubcommand::Whoami => match app.user() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                println!("  student number: {}", or_dash(Some(&user.student_number)));
                println!("  role:           {}", user.role);
            }
            None => println!("Not signed in"),
        },
        AuthSubcommand::Register {
            name,
            email,
            student_number,
            password,
        } => {
            let request = RegisterRequest {
                name,
                email,
                student_number,
                password,
            };
            account::register(app, &request).await?;
            println!("✓ Registration sent; an admin has to approve it before you can sign in");
        }
        AuthSubcommand::CheckStudentNumber { student_number } => {
            let free = account::check_student_number(app, &student_number).await?;
            print_availability("Student number", &student_number, free);
        }
        AuthSubcommand::CheckEmail { email } => {
            let free = account::check_email(app, &email).await?;
            print_availability("Email", &email, free);
        }
    }
    Ok(())
}

fn print_availability(what: &str, value: &str, free: bool) {
    if free {
        println!("✓ {what} '{value}' is available");
    } else {
        println!("✗ {what} '{value}' is already registered");
    }
}

/// Print the user page
///
/// # Errors
/// Returns the failed fetch; its alert is already raised
pub async fn me(app: &App) -> anyhow::Result<()> {
    let page = account::user_page(app).await?;
    println!("{} <{}>", page.name, page.email);
    println!("  student number: {}", or_dash(Some(&page.student_number)));
    if let Some(role) = &page.role {
        println!("  role:           {role}");
    }
    println!("  profile image:  {}", app.image_url(page.profile_image.as_deref()));
    if page.groups.is_empty() {
        println!("\nNo groups yet");
    } else {
        println!("\nGroups:");
        for group in &page.groups {
            println!("  [{}] {} {}", group.id, group.name, or_dash(group.generation.as_deref()));
        }
    }
    Ok(())
}

/// Dispatch announcement subcommands
///
/// # Errors
/// Returns the failed operation; its alert is already raised
pub async fn announcement(app: &App, subcommand: AnnouncementSubcommand) -> anyhow::Result<()> {
    match subcommand {
        AnnouncementSubcommand::List => {
            let list = account::load_announcements(app).await?;
            if list.is_empty() {
                println!("No announcements");
            }
            for item in list {
                println!(
                    "[{}] {}  ({}, {})",
                    item.id,
                    item.title,
                    or_dash(Some(&item.author)),
                    or_dash(item.created_at.as_deref())
                );
            }
        }
        AnnouncementSubcommand::Show { id } => {
            let item = account::announcement(app, id).await?;
            println!("{}\n", item.title);
            println!("{}", item.content);
        }
        AnnouncementSubcommand::Create { title, content } => {
            let list = account::create_announcement(app, &title, &content).await?;
            println!("✓ Published ({} announcements)", list.len());
        }
        AnnouncementSubcommand::Update { id, title, content } => {
            account::update_announcement(app, id, &title, &content).await?;
            println!("✓ Updated announcement {id}");
        }
        AnnouncementSubcommand::Delete { id } => {
            account::delete_announcement(app, id).await?;
            println!("✓ Deleted announcement {id}");
        }
    }
    Ok(())
}

/// Dispatch approval subcommands
///
/// # Errors
/// Returns the failed operation; its alert is already raised
pub async fn approval(app: &App, subcommand: ApprovalSubcommand) -> anyhow::Result<()> {
    match subcommand {
        ApprovalSubcommand::List => {
            let pending = account::pending_members(app).await?;
            if pending.is_empty() {
                println!("Nobody is waiting for approval");
            }
            for member in pending {
                println!(
                    "{}  {} <{}>  requested {}",
                    member.student_number,
                    member.name,
                    member.email,
                    or_dash(member.requested_at.as_deref())
                );
            }
        }
        ApprovalSubcommand::Approve { student_number } => {
            account::approve_member(app, &student_number).await?;
            println!("✓ Approved {}", student_number.trim());
        }
    }
    Ok(())
}

/// Show or change the theme preference
pub fn theme(app: &App, action: ThemeArg) {
    let dark = match action {
        ThemeArg::Show => app.ui().dark_mode,
        ThemeArg::Dark => {
            app.set_dark_mode(true);
            true
        }
        ThemeArg::Light => {
            app.set_dark_mode(false);
            false
        }
        ThemeArg::Toggle => app.toggle_dark_mode(),
    };
    println!("Theme: {}", if dark { "dark" } else { "light" });
}
