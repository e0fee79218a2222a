use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Subcommand};
use tokio::sync::watch;

use roadmap_sync::{
    AuthProvider, HttpAuthProvider, HttpClient, Identity, LocalGateway, PersistenceGateway,
    RemoteGateway, SaveMode, Session, SignUpOutcome, SyncError,
};

use super::Context;
use crate::auth_store::{load_auth_config, save_auth_config, AuthProfile};
use crate::config::Backend;
use crate::output;

#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommand,
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        /// Base URL of the hosted backend (default: config base_url)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Sign in and store the session in the selected profile
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Sign out of the selected profile
    Logout,
    /// Show who the selected profile is signed in as
    Whoami,
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("a password is required");
    }
    Ok(password)
}

fn resolve_base_url(ctx: &Context, flag: Option<String>) -> anyhow::Result<String> {
    flag.or_else(|| ctx.base_url())
        .ok_or_else(|| anyhow::anyhow!("pass --base-url or set base_url in the config"))
}

pub async fn run(ctx: &Context, args: AuthArgs) -> anyhow::Result<()> {
    match args.command {
        AuthCommand::Signup { email, base_url } => signup(ctx, email, base_url).await,
        AuthCommand::Login { email, base_url } => login(ctx, email, base_url).await,
        AuthCommand::Logout => logout(ctx).await,
        AuthCommand::Whoami => {
            match ctx.auth_profile() {
                Some(profile) => {
                    println!("{}", output::kv("profile", &ctx.profile));
                    println!("{}", output::kv("identity", &profile.identity));
                    println!("{}", output::kv("email", profile.email.as_deref().unwrap_or("-")));
                    println!("{}", output::kv("base_url", &profile.base_url));
                }
                None => println!("Not signed in (profile '{}')", ctx.profile),
            }
            Ok(())
        }
    }
}

async fn signup(ctx: &Context, email: String, base_url: Option<String>) -> anyhow::Result<()> {
    let base_url = resolve_base_url(ctx, base_url)?;
    let password = prompt_password("Choose a password: ")?;
    let provider = HttpAuthProvider::new(HttpClient::new(&base_url));

    match provider
        .sign_up(&email, &password)
        .await
        .map_err(SyncError::from)?
    {
        SignUpOutcome::SignedIn(identity) => {
            store_profile(ctx, &base_url, &identity)?;
            println!("Account created, signed in as {email}");
            identity_changed(ctx, &base_url, Some(identity)).await
        }
        SignUpOutcome::ConfirmationRequired => {
            println!("Account created. Confirm your email, then run `roadmap auth login`.");
            Ok(())
        }
    }
}

async fn login(ctx: &Context, email: String, base_url: Option<String>) -> anyhow::Result<()> {
    let base_url = resolve_base_url(ctx, base_url)?;
    let password = prompt_password("Password: ")?;
    let provider = HttpAuthProvider::new(HttpClient::new(&base_url));

    let identity = provider
        .sign_in(&email, &password)
        .await
        .map_err(SyncError::from)?;
    store_profile(ctx, &base_url, &identity)?;
    println!("Signed in as {email}");
    identity_changed(ctx, &base_url, Some(identity)).await
}

async fn logout(ctx: &Context) -> anyhow::Result<()> {
    let mut config = load_auth_config();
    let Some(profile) = config.profiles.remove(&ctx.profile) else {
        println!("Not signed in (profile '{}')", ctx.profile);
        return Ok(());
    };

    let provider =
        HttpAuthProvider::with_identity(HttpClient::new(&profile.base_url), Some(profile.to_identity()));
    if let Err(e) = provider.sign_out().await {
        tracing::warn!(error = %e, "remote sign-out failed");
    }
    save_auth_config(&config)?;
    println!("Signed out of profile '{}'", ctx.profile);
    identity_changed(ctx, &profile.base_url, None).await
}

fn store_profile(ctx: &Context, base_url: &str, identity: &Identity) -> anyhow::Result<()> {
    let mut config = load_auth_config();
    config
        .profiles
        .insert(ctx.profile.clone(), AuthProfile::from_identity(base_url, identity));
    save_auth_config(&config)
}

/// With the remote backend the working roadmap belongs to the signed-in
/// account, so it is cleared and the new account's roadmaps are listed.
async fn identity_changed(
    ctx: &Context,
    base_url: &str,
    identity: Option<Identity>,
) -> anyhow::Result<()> {
    if ctx.config.backend != Backend::Remote {
        return Ok(());
    }

    let store = ctx.store()?;
    let (_, rx) = watch::channel(identity.clone());
    let gateway = Arc::new(RemoteGateway::new(HttpClient::new(base_url), rx));
    let session = Session::new(ctx.editor(&store), gateway);
    let documents = session.on_identity_changed(identity.as_ref()).await?;

    let snapshot = session.editor().read().await.snapshot();
    LocalGateway::new(store)
        .save(&snapshot, SaveMode::Auto)
        .await
        .map_err(SyncError::from)?;
    ctx.forget_remote(None)?;

    if identity.is_some() {
        println!("{}", output::header("Your roadmaps"));
        println!("{}", output::render_summaries(&documents));
    }
    Ok(())
}
