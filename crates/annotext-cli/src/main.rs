use annotext_config::Config;
use annotext_engine::{
    AnnotationDraft, Selection, Session, TextPosition, advance_visible, inverse_offset,
};
use anyhow::{Context, Result, bail};
use std::{env, path::PathBuf, process};

const USAGE: &str = "Usage:
  annotext-cli <file.docx>                                   show outline and annotations
  annotext-cli <file.docx> annotate <start> <end> <kind> <literal>
  annotext-cli <file.docx> remove <number>                   number as listed";

#[derive(Debug)]
enum Command {
    Show,
    Annotate {
        start: usize,
        end: usize,
        kind: String,
        literal: String,
    },
    Remove {
        number: usize,
    },
}

fn parse_args(args: &[String]) -> Result<(PathBuf, Command)> {
    let Some(path) = args.first() else {
        bail!("missing document path");
    };
    let path = PathBuf::from(path);

    let command = match args.get(1).map(String::as_str) {
        None => Command::Show,
        Some("annotate") => match &args[2..] {
            [start, end, kind, literal] => Command::Annotate {
                start: start.parse().context("start must be a character offset")?,
                end: end.parse().context("end must be a character offset")?,
                kind: kind.clone(),
                literal: literal.clone(),
            },
            _ => bail!("annotate takes <start> <end> <kind> <literal>"),
        },
        Some("remove") => match &args[2..] {
            [number] => Command::Remove {
                number: number.parse().context("number must be a positive integer")?,
            },
            _ => bail!("remove takes <number>"),
        },
        Some(other) => bail!("unknown command {other:?}"),
    };
    Ok((path, command))
}

fn print_session(session: &Session) {
    println!("{}", session.path().display());
    print!("{}", session.model().outline());

    if session.annotations().is_empty() {
        println!("\nNo annotations");
        return;
    }

    println!();
    for (kind, members) in session.annotations_by_style() {
        println!("{kind}:");
        for annotation in members {
            let number = session
                .annotations()
                .iter()
                .position(|a| a.id == annotation.id)
                .map_or(0, |i| i + 1);
            println!(
                "  {number}. [{}..{}] {:?} = {:?}",
                annotation.start, annotation.end, annotation.text, annotation.literal
            );
        }
    }

    let unplaced = &session.load_report().unplaced;
    if !unplaced.is_empty() {
        println!("\n{} annotations could not be placed", unplaced.len());
    }
}

fn run(path: PathBuf, command: Command) -> Result<()> {
    log::debug!("{command:?} on {}", path.display());
    let config = Config::load()?;
    let styles = config
        .load_styles()
        .with_context(|| format!("loading styles from {}", config.styles_path.display()))?;
    let mut session =
        Session::open(&path, styles).with_context(|| format!("opening {}", path.display()))?;

    match command {
        Command::Show => {}
        Command::Annotate {
            start,
            end,
            kind,
            literal,
        } => {
            if end <= start {
                bail!("end must be greater than start");
            }
            let tree = session.tree();
            let from = inverse_offset(tree, TextPosition(0), start)
                .context("start is past the end of the document")?;
            let to = advance_visible(tree, from, end - start)
                .context("end is past the end of the document")?;
            let annotation =
                session.insert(Selection::new(from, to), AnnotationDraft::new(kind, literal))?;
            println!("Annotated {:?}", annotation.text);
        }
        Command::Remove { number } => {
            let id = number
                .checked_sub(1)
                .and_then(|i| session.annotations().get(i))
                .map(|a| a.id)
                .with_context(|| format!("no annotation numbered {number}"))?;
            session.remove(id)?;
            println!("Removed annotation {number}");
        }
    }

    print_session(&session);
    session.close()?;
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (path, command) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}\n\n{USAGE}");
            process::exit(1);
        }
    };

    if let Err(e) = run(path, command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
