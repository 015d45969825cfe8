use anyhow::Context;
use review_requests::{
    GitHub, MenuLine, MenuStyle, load_settings,
    menu::{config_diagnostic, fetch_failed},
    parse_args, review_menu, write_menu,
};
use tracing::warn;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout belongs to the status bar; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let invocation = match parse_args(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    init_tracing(invocation.debug);

    let lines: Vec<MenuLine> = match load_settings(&invocation.config_path, &invocation.section) {
        Ok(settings) => match GitHub::new(&settings, invocation.timeout) {
            Ok(github) => {
                let style = MenuStyle::with_wip_label(&settings.wip_label);
                review_menu(&settings, &style, &github).await
            }
            Err(err) => {
                warn!("Cannot create GitHub client: {}", err);
                fetch_failed(&err)
            }
        },
        Err(err) => {
            warn!("{}", err);
            config_diagnostic(&err)
        }
    };

    let mut stdout = std::io::stdout().lock();
    write_menu(&lines, &mut stdout).context("Failed to write menu to stdout")?;

    Ok(())
}
