//! # Credentials Command
//!
//! Derive-based implementation of the credentials command: checks the
//! `.netrc` entry for the YouTrack server and sets one up interactively.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};
use ytrack_api::auth::{CredentialOverrides, check_youtrack_credentials, create_youtrack_runtime_and_client};
use ytrack_core::config::get_config_dirs;
use ytrack_core::consts::NETRC_TOKEN_LOGIN;
use ytrack_core::creds::netrc::{get_netrc_path, has_insecure_permissions, write_netrc_entry};
use ytrack_core::output::{format_command, format_path, print_error, print_info, print_success, print_warning};
use ytrack_core::url::{ensure_url_scheme, resolve_server_url, server_host};

use crate::cli::GlobalArgs;
use crate::clients::{home_dir, load_config};

/// Command for credential management
#[derive(Args)]
pub struct CredsArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: CredsSubcommands,
}

/// Subcommands for the creds command
#[derive(Subcommand)]
pub enum CredsSubcommands {
  /// Check if credentials are properly configured
  #[command(long_about = "Checks that credentials for the YouTrack server are configured.\n\n\
                      Verifies that your .netrc file exists with secure permissions and has an\n\
                      entry for the server host, then asks YouTrack who you are logged in as.")]
  Check,

  /// Set up credentials interactively
  #[command(long_about = "Interactive wizard to store YouTrack credentials in .netrc.\n\n\
                      Choose between a permanent token (recommended) and a user name with a\n\
                      password. The server URL is saved to the configuration file.")]
  Setup,
}

/// Handle the creds command
pub(crate) fn handle_creds_command(creds: CredsArgs, global: &GlobalArgs) -> Result<()> {
  match creds.subcommand {
    CredsSubcommands::Check => handle_check_command(global),
    CredsSubcommands::Setup => handle_setup_command(global),
  }
}

fn handle_check_command(global: &GlobalArgs) -> Result<()> {
  let home = home_dir()?;
  let server_url = resolve_server_url(global.server.as_deref(), &load_config()?)?;
  let host = server_host(&server_url)?;
  let netrc_path = get_netrc_path(&home);

  if !netrc_path.exists() {
    print_warning("No .netrc file found.");
    println!(
      "Create {} or run {}.",
      format_path(&netrc_path.display().to_string()),
      format_command("ytrack creds setup")
    );
  } else {
    if has_insecure_permissions(&netrc_path)? {
      print_warning("Your .netrc file has insecure permissions.");
      println!(
        "For security, change permissions to 600: {}",
        format_command(&format!("chmod 600 {}", netrc_path.display()))
      );
    } else {
      print_success(".netrc file has secure permissions.");
    }

    if check_youtrack_credentials(&home, &server_url)? {
      print_success(&format!("Credentials found for {host}."));
    } else {
      print_warning(&format!("No credentials found for machine '{host}'."));
    }
  }

  print_info(&format!("Checking connection to {server_url}..."));
  let (rt, client) = create_youtrack_runtime_and_client(&home, &server_url, &global.credential_overrides())?;
  match rt.block_on(client.current_user()) {
    Ok(user) => {
      let name = user.full_name.unwrap_or_else(|| user.login.clone());
      print_success(&format!("Connected as {name} ({})", user.login));
    }
    Err(e) => print_error(&format!("Could not verify credentials: {e}")),
  }

  print_info("Example .netrc entries:");
  println!("```");
  println!("machine {host}");
  println!("  login {NETRC_TOKEN_LOGIN}");
  println!("  password perm:your-permanent-token");
  println!();
  println!("machine {host}");
  println!("  login your-user-name");
  println!("  password your-password");
  println!("```");

  Ok(())
}

fn handle_setup_command(global: &GlobalArgs) -> Result<()> {
  print_info("Welcome to the ytrack credential setup wizard!");
  println!("• Credentials will be stored in ~/.netrc");
  println!("• File permissions will be set to 600");
  println!();

  let theme = ColorfulTheme::default();
  let dirs = get_config_dirs()?;
  let mut config = dirs.load_config()?;

  let mut prompt = Input::<String>::with_theme(&theme).with_prompt("YouTrack server URL");
  if let Some(current) = global.server.clone().or(config.server_url.clone()) {
    prompt = prompt.with_initial_text(current);
  }
  let server = ensure_url_scheme(&prompt.interact_text().context("Failed to read server URL")?)?;
  let host = server_host(&server)?;

  let methods = ["Permanent token (recommended)", "User name and password"];
  let method = Select::with_theme(&theme)
    .with_prompt("How do you want to authenticate?")
    .items(&methods)
    .default(0)
    .interact()
    .context("Failed to read authentication method")?;

  let (login, secret, overrides) = if method == 0 {
    let token = Password::with_theme(&theme)
      .with_prompt("Permanent token")
      .interact()
      .context("Failed to read token")?;
    let overrides = CredentialOverrides {
      token: Some(token.clone()),
      ..CredentialOverrides::default()
    };
    (NETRC_TOKEN_LOGIN.to_string(), token, overrides)
  } else {
    let username: String = Input::with_theme(&theme)
      .with_prompt("User name")
      .interact_text()
      .context("Failed to read user name")?;
    let password = Password::with_theme(&theme)
      .with_prompt("Password")
      .interact()
      .context("Failed to read password")?;
    let overrides = CredentialOverrides {
      token: None,
      username: Some(username.clone()),
      password: Some(password.clone()),
    };
    (username, password, overrides)
  };

  print_info("Validating credentials...");
  let home = home_dir()?;
  let (rt, client) = create_youtrack_runtime_and_client(&home, &server, &overrides)?;
  match rt.block_on(async {
    client.login().await?;
    client.current_user().await
  }) {
    Ok(user) => print_success(&format!("Logged in as {}", user.login)),
    Err(e) => {
      print_error(&format!("Could not validate credentials: {e}"));
      print_info("Nothing was saved. Run 'ytrack creds setup' again to retry.");
      return Ok(());
    }
  }

  let netrc_path = get_netrc_path(&home);
  write_netrc_entry(&netrc_path, &host, &login, &secret)?;
  print_success(&format!(
    "Saved credentials for {host} to {}",
    format_path(&netrc_path.display().to_string())
  ));

  config.server_url = Some(server);
  dirs.save_config(&config)?;
  print_success(&format!(
    "Saved server URL to {}",
    format_path(&dirs.config_path().display().to_string())
  ));

  Ok(())
}
