mod printer;
mod repl;

use std::io::Write;

use anyhow::Result;
use avltree::TreeError;
use clap::Parser;
use repl::{Command, ReplError, Session, TreeKind};

/// Interactive playground for the trees in this crate.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Tree implementation to drive
    #[arg(long, value_enum, default_value_t = TreeKind::Avl)]
    kind: TreeKind,

    /// Don't print the prompt
    #[arg(short, long)]
    quiet: bool,

    /// Elements inserted before the prompt starts
    #[arg(allow_negative_numbers = true)]
    elements: Vec<i64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut session = Session::new(args.kind);
    for element in args.elements {
        session.tree_mut().insert(element)?;
    }

    let mut stdout = std::io::stdout();

    loop {
        let Some(line) = readline(args.quiet)? else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match Command::try_from(line).and_then(|command| session.handle(command, &mut stdout)) {
            Ok(should_quit) => {
                if should_quit {
                    return Ok(());
                }
            }
            Err(e) if e.is::<ReplError>() || e.is::<TreeError>() => eprintln!("{}", e),
            Err(e) => return Err(e),
        };
    }
}

// None on end of input
fn readline(quiet: bool) -> Result<Option<String>> {
    if !quiet {
        print!("> ");
        std::io::stdout().flush()?;
    }

    let mut buf = String::new();
    if std::io::stdin().read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}
