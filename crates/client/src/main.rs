//! Teammate CLI - composition root binary
//!
//! Wires the HTTP adapter, file storage, and chat socket into `Services` and
//! runs one subcommand.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use teammate_client::application::services::form_from_profile;
use teammate_client::infrastructure::{ChatSocketClient, FileStorageProvider, HttpApiClient};
use teammate_client::ports::outbound::{RawApiPort, StorageProvider};
use teammate_client::{
    ChatLine, ChatSession, ClientConfig, SendOutcome, Services, SessionContext, SessionUpdate,
};
use teammate_domain::{
    Availability, DeveloperType, MatchId, MessageId, ProfileForm, ProfileId, SkillCategory,
    SkillId, TeammatePreference,
};
use teammate_shared::ProfileData;

#[derive(Parser)]
#[command(name = "teammate", version, about = "Find developer teammates and chat with matches")]
struct Cli {
    /// REST API base URL (overrides TEAMMATE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with a Google ID token
    Login {
        #[arg(long, env = "TEAMMATE_GOOGLE_TOKEN", hide_env_values = true)]
        google_token: String,
    },
    Logout,
    /// Show the signed-in account and profile
    Whoami,
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// List the skill catalogue
    Skills {
        #[arg(long)]
        category: Option<SkillCategory>,
    },
    /// Profiles suggested for you
    Suggestions,
    Like { profile_id: ProfileId },
    Unlike { profile_id: ProfileId },
    #[command(subcommand)]
    Likes(LikesCommand),
    Matches,
    /// Open a live chat with a match
    Chat { match_id: MatchId },
    MarkRead { message_id: MessageId },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show a profile (your own when no id is given)
    Show { profile_id: Option<ProfileId> },
    /// Create or update your profile; unset flags keep their current value
    Save(ProfileArgs),
}

#[derive(Subcommand)]
enum LikesCommand {
    Received,
    Given,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    github: Option<String>,
    #[arg(long)]
    x: Option<String>,
    #[arg(long)]
    portfolio: Option<String>,
    #[arg(long)]
    developer_type: Option<DeveloperType>,
    #[arg(long)]
    teammate_preference: Option<TeammatePreference>,
    /// Skill id; repeat for several
    #[arg(long = "skill")]
    skills: Vec<SkillId>,
    /// Wanted skill id; repeat for several
    #[arg(long = "looking-for")]
    looking_for: Vec<SkillId>,
    #[arg(long)]
    years: Option<u32>,
    #[arg(long)]
    project_type: Option<String>,
    #[arg(long)]
    availability: Option<Availability>,
}

impl ProfileArgs {
    fn apply(self, form: &mut ProfileForm) {
        if self.age.is_some() {
            form.age = self.age;
        }
        if let Some(bio) = self.bio {
            form.bio = bio;
        }
        if let Some(url) = self.github {
            form.github_url = url;
        }
        if let Some(url) = self.x {
            form.x_url = url;
        }
        if let Some(url) = self.portfolio {
            form.portfolio_url = url;
        }
        if let Some(developer_type) = self.developer_type {
            form.developer_type = developer_type;
        }
        if let Some(preference) = self.teammate_preference {
            form.teammate_preference = preference;
        }
        if !self.skills.is_empty() {
            form.skill_ids = self.skills;
        }
        if !self.looking_for.is_empty() {
            form.looking_for_ids = self.looking_for;
        }
        if let Some(years) = self.years {
            form.years_of_experience = years;
        }
        if let Some(project_type) = self.project_type {
            form.preferred_project_type = project_type;
        }
        if let Some(availability) = self.availability {
            form.availability = availability;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teammate_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    tracing::debug!(api_url = %config.api_url, ws_url = %config.ws_url, "Loaded config");

    let storage: Arc<dyn StorageProvider> =
        Arc::new(FileStorageProvider::open(config.storage_path.clone()));
    let raw_api: Arc<dyn RawApiPort> = Arc::new(HttpApiClient::new(&config, storage.clone()));
    let services = Services::new(raw_api, storage);
    let transport = ChatSocketClient::new(config.ws_url.clone());

    run(cli.command, &services, &transport).await
}

async fn run(command: Command, services: &Services, transport: &ChatSocketClient) -> Result<()> {
    match command {
        Command::Login { google_token } => {
            let (ctx, outcome) = services.auth.login_with_google(&google_token).await?;
            let name = ctx.display_name().unwrap_or_else(|| "there".to_string());
            if outcome.created {
                println!("Welcome, {name}! Your account was created.");
            } else {
                println!("Welcome back, {name}.");
            }
            if !outcome.has_profile {
                println!("No profile yet; create one with `teammate profile save`.");
            }
        }
        Command::Logout => {
            services.auth.logout();
            println!("Signed out.");
        }
        Command::Whoami => {
            let ctx = signed_in(services).await?;
            if let Some(user) = ctx.user() {
                println!("{} <{}> (user {})", user.display_name(), user.email, user.id);
            }
            match ctx.profile() {
                Some(profile) => print_profile(profile),
                None => println!("No profile yet."),
            }
        }
        Command::Profile(ProfileCommand::Show { profile_id }) => {
            let profile = match profile_id {
                Some(id) => services.profiles.get(id).await?,
                None => {
                    let ctx = signed_in(services).await?;
                    ctx.profile()
                        .cloned()
                        .ok_or_else(|| anyhow!("no profile yet"))?
                }
            };
            print_profile(&profile);
        }
        Command::Profile(ProfileCommand::Save(args)) => {
            let mut ctx = signed_in(services).await?;
            let mut form = ctx.profile().map(form_from_profile).unwrap_or_default();
            args.apply(&mut form);
            let profile = services.profiles.save_profile(&mut ctx, &form).await?;
            println!("Profile saved.");
            print_profile(&profile);
        }
        Command::Skills { category } => match category {
            Some(category) => {
                for skill in services.skills.by_category(category).await? {
                    println!("{:>4}  {}", skill.id, skill.name);
                }
            }
            None => {
                let catalogue = services.skills.catalogue().await;
                if catalogue.is_fallback() {
                    eprintln!("(skill list unavailable, showing common skills)");
                }
                for name in catalogue.names() {
                    println!("{name}");
                }
            }
        },
        Command::Suggestions => {
            for profile in services.profiles.suggestions().await? {
                let score = profile
                    .compatibility_score
                    .map(|s| format!("{s:.0}%"))
                    .unwrap_or_default();
                println!(
                    "{:>4}  {:<24} {:<22} {:>5}  {}",
                    profile.id,
                    profile.display_name(),
                    profile.developer_type.label(),
                    score,
                    profile.skill_names().join(", ")
                );
            }
        }
        Command::Like { profile_id } => {
            let outcome = services.profiles.like(profile_id).await?;
            match outcome.matched.filter(|_| outcome.is_new_match) {
                Some(matched) => println!("It's a match! Chat with `teammate chat {}`.", matched.id),
                None => println!("Liked."),
            }
        }
        Command::Unlike { profile_id } => {
            let outcome = services.profiles.unlike(profile_id).await?;
            println!("{}", if outcome.unliked { "Unliked." } else { "Nothing to unlike." });
        }
        Command::Likes(which) => {
            let (likes, received) = match which {
                LikesCommand::Received => (services.likes.received().await?, true),
                LikesCommand::Given => (services.likes.given().await?, false),
            };
            for like in likes {
                let (id, profile) = if received {
                    (like.liker, like.liker_profile)
                } else {
                    (like.liked, like.liked_profile)
                };
                let name = profile.map(|p| p.display_name()).unwrap_or_default();
                println!("{id:>4}  {name}");
            }
        }
        Command::Matches => {
            let ctx = signed_in(services).await?;
            let me = ctx.profile().map(|p| p.id);
            for matched in services.matches.list().await? {
                let other = me
                    .and_then(|me| matched.other_profile(me))
                    .map(ProfileData::display_name)
                    .unwrap_or_default();
                println!("{:>4}  {}", matched.id, other);
            }
        }
        Command::Chat { match_id } => {
            let mut ctx = signed_in(services).await?;
            chat(&mut ctx, services, transport, match_id).await?;
        }
        Command::MarkRead { message_id } => {
            services.chat.mark_as_read(message_id).await?;
            println!("Marked as read.");
        }
    }
    Ok(())
}

async fn signed_in(services: &Services) -> Result<SessionContext> {
    services
        .auth
        .restore()
        .await
        .ok_or_else(|| anyhow!("not signed in; run `teammate login` first"))
}

async fn chat(
    ctx: &mut SessionContext,
    services: &Services,
    transport: &ChatSocketClient,
    match_id: MatchId,
) -> Result<()> {
    let mut session = ChatSession::open(ctx, services, transport, match_id).await;
    let partner = session
        .other_user_name()
        .unwrap_or_else(|| "your match".to_string());

    println!("Chat with {partner}. Type /quit to leave.");
    for line in session.lines() {
        print_line(line);
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut live = true;
    loop {
        tokio::select! {
            text = input.next_line() => {
                let Some(text) = text.context("reading stdin")? else {
                    break;
                };
                if text.trim() == "/quit" {
                    break;
                }
                session.set_draft(text);
                match session.send_draft().await {
                    Ok(SendOutcome::Fallback(line)) => print_line(&line),
                    Ok(SendOutcome::Realtime | SendOutcome::Skipped) => {}
                    Err(e) => eprintln!("[not sent] {e}"),
                }
            }
            update = session.next_update(), if live => match update {
                Some(SessionUpdate::Message(line)) => print_line(&line),
                Some(SessionUpdate::Connected) => println!("[connected]"),
                Some(SessionUpdate::ServerError(message)) => eprintln!("[server] {message}"),
                Some(SessionUpdate::Offline(error)) => {
                    println!("[offline] {error}; messages are sent over HTTP");
                }
                Some(SessionUpdate::Ignored) => {}
                None => live = false,
            },
        }
    }

    session.close();
    Ok(())
}

fn print_line(line: &ChatLine) {
    let time = line
        .message
        .created_at
        .map(|t| t.format("%H:%M ").to_string())
        .unwrap_or_default();
    let who = if line.is_mine() { "me" } else { "them" };
    println!("{time}{who}> {}", line.message.text);
}

fn print_profile(profile: &ProfileData) {
    println!("{} (profile {})", profile.display_name(), profile.id);
    if let Some(age) = profile.age {
        println!("  age: {age}");
    }
    println!("  role: {}", profile.developer_type.label());
    println!("  looking for: {}", profile.teammate_preference.label());
    println!("  availability: {}", profile.availability.label());
    println!("  experience: {} years", profile.years_of_experience);
    if !profile.skills.is_empty() {
        println!("  skills: {}", profile.skill_names().join(", "));
    }
    if !profile.bio.is_empty() {
        println!("  bio: {}", profile.bio);
    }
    for url in [&profile.github_url, &profile.x_url, &profile.portfolio_url] {
        if !url.is_empty() {
            println!("  {url}");
        }
    }
}
