//!
//! blogdesk CLI binary
//! --------------------
//! Command-line front end over the session client and router. The session is
//! kept in a JSON file (see `BLOGDESK_SESSION_FILE`) so it survives between runs.

use std::env;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use blogdesk::http::RegisterRequest;
use blogdesk::{App, AppError, ClientConfig};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <command> [args]\n\nCommands:\n  status                                     show api base and stored session\n  login <identifier> <password>              log in and store the session\n  register <username> <email> <password> [--admin]\n                                             create an account (--admin files a role request)\n  whoami                                     fetch the current profile (GET /me)\n  open <path>                                navigate to a route, e.g. /admin/pending\n  get <path>                                 GET an API path with the stored credential\n  logout                                     forget the stored session\n\nEnvironment:\n  BLOGDESK_API_BASE_URL     server origin (default http://localhost:3000)\n  BLOGDESK_HTTP_TIMEOUT_MS  per-request timeout (default 10000)\n  BLOGDESK_ROLE_TIMEOUT_MS  role lookup timeout (default 5000)\n  BLOGDESK_SESSION_FILE     session file (default blogdesk-session.json)\n  RUST_LOG                  log filter (default info)"
    );
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// One-line hint for the errors a user can act on.
fn explain(err: &AppError) -> Option<&'static str> {
    match err {
        AppError::Unauthorized { .. } => Some("session expired or invalid; run `login` again"),
        AppError::Forbidden { .. } => Some("your account is not allowed to do that"),
        AppError::Timeout(_) | AppError::Transport(_) => Some("is the API running? check BLOGDESK_API_BASE_URL"),
        _ => None,
    }
}

async fn run(app: &App, args: &[String]) -> Result<(), AppError> {
    let cmd = args.first().map(String::as_str).unwrap_or("status");
    match cmd {
        "status" => {
            let s = app.session().snapshot();
            println!("api: {}", app.client().base());
            if s.is_authenticated() {
                println!(
                    "logged in as {} <{}> id={} role={}",
                    s.username.as_deref().unwrap_or("?"),
                    s.email.as_deref().unwrap_or("?"),
                    s.id.as_deref().unwrap_or("?"),
                    s.role.as_deref().unwrap_or("<unresolved>")
                );
            } else {
                println!("not logged in");
            }
        }
        "login" => {
            let (Some(ident), Some(pass)) = (args.get(1), args.get(2)) else {
                return Err(AppError::Config("usage: login <identifier> <password>".into()));
            };
            let rec = app.client().login(ident, pass).await?;
            println!("logged in as {}", rec.username.as_deref().unwrap_or(ident));
        }
        "register" => {
            if args.len() < 4 {
                return Err(AppError::Config("usage: register <username> <email> <password> [--admin]".into()));
            }
            let req = RegisterRequest {
                username: args[1].clone(),
                email: args[2].clone(),
                password: args[3].clone(),
                role: has_flag(args, "--admin").then(|| "admin".to_string()),
            };
            println!("{}", app.client().register(&req).await?);
        }
        "whoami" => {
            let me = app.client().me().await?;
            println!("{} <{}> id={} role={} followers={}", me.username, me.email, me.id, me.role, me.followers.len());
        }
        "open" => {
            let path = args.get(1).map(String::as_str).unwrap_or("/");
            let nav = app.navigate(path).await?;
            if let Some(n) = &nav.notice {
                println!("! {}", n);
            }
            println!("{} -> view '{}'", nav.path, nav.view);
            for (k, v) in &nav.params {
                println!("  {} = {}", k, v);
            }
        }
        "get" => {
            let path = args.get(1).map(String::as_str).unwrap_or("/me");
            let resp = app.client().get(path).await?;
            println!("{}", serde_json::to_string_pretty(&resp.body).unwrap_or_else(|_| resp.body.to_string()));
        }
        "logout" => {
            app.client().logout()?;
            println!("logged out");
        }
        other => return Err(AppError::Config(format!("unknown command '{}'", other))),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let argv: Vec<String> = env::args().collect();
    let program = argv.first().cloned().unwrap_or_else(|| "blogdesk".to_string());
    let args = &argv[1.min(argv.len())..];
    if has_flag(args, "-h") || has_flag(args, "--help") {
        print_usage(&program);
        return Ok(());
    }

    let cfg = ClientConfig::from_env()?;
    info!(target: "blogdesk", "session file {}", cfg.session_file.display());
    let app = App::open(&cfg)?;

    if let Err(e) = run(&app, args).await {
        if let AppError::Config(msg) = &e {
            eprintln!("{}", msg);
            print_usage(&program);
        } else {
            eprintln!("error: {}", e);
            if let Some(hint) = explain(&e) {
                eprintln!("hint: {}", hint);
            }
        }
        std::process::exit(1);
    }
    Ok(())
}
