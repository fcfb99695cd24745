use std::{
    error::Error,
    io::{self, Write},
    process,
};

use clap::Parser;
use log::info;
use skyhash::{
    Command, Config, Query,
    cli::{CliError, prompt},
    config::{DEFAULT_HOST, DEFAULT_PORT},
};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Username to authenticate as
    #[arg(short, long, default_value = "root")]
    user: String,
    /// Password for the user
    #[arg(short, long)]
    password: String,
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,
    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    ctrlc::set_handler(|| {
        info!("interrupted, terminating session");
        process::exit(130);
    })?;

    let config = Config::new(cli.user, cli.password)
        .with_host(cli.host)
        .with_port(cli.port);
    let mut con = config.connect()?;
    println!("connected to {}:{}", config.host(), config.port());

    let stdin = io::stdin();
    let stdout = io::stdout();

    loop {
        let cmd = match prompt(stdin.lock(), stdout.lock()) {
            Ok(c) => c,
            Err(CliError::Empty) => continue,
            Err(CliError::Io(e)) => return Err(e.into()),
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match cmd {
            Command::Exit => break,
            Command::Query(q) => match con.query(&Query::new(q)) {
                Ok(resp) => {
                    let mut out = stdout.lock();
                    writeln!(out, "{resp}")?;
                }
                Err(e) => return Err(e.into()),
            },
        }
    }

    con.close()?;
    Ok(())
}
