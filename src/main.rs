use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use change_detector::{Detector, TIME_FORMAT};
use revision_store::Store;
use structopt::StructOpt;

use crate::source::{FileSource, Source};

mod session;
mod source;

#[derive(Debug, StructOpt)]
#[structopt(
    about = "Tracks the last known revision of named artifacts, and reports when they change."
)]
struct Opt {
    #[structopt(
        short,
        long,
        default_value = "revisions.json",
        env = "FN_REVISION_FILE",
        parse(from_os_str),
        help = "revision file"
    )]
    revision_file: PathBuf,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(about = "check if an artifact changed since its last revision")]
    Diff(Artifact),

    #[structopt(about = "record the current text of an artifact as its revision")]
    Update(Artifact),

    #[structopt(about = "forget every recorded revision")]
    DeleteAll,

    #[structopt(about = "show the recorded revision of an artifact")]
    ShowOld {
        #[structopt(help = "artifact name")]
        name: String,
    },

    #[structopt(about = "show the current text of an artifact")]
    ShowNew(Artifact),

    #[structopt(about = "list every tracked artifact")]
    List,

    #[structopt(about = "check an artifact, then interactively update or show it")]
    Check(Artifact),
}

#[derive(Debug, StructOpt)]
struct Artifact {
    #[structopt(parse(from_os_str), help = "file containing the artifact, or - for stdin")]
    path: PathBuf,

    #[structopt(
        short,
        long,
        help = "name to track the artifact under; defaults to the path"
    )]
    name: Option<String>,
}

impl Artifact {
    fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.path.display().to_string(),
        }
    }

    fn observe<S: Source>(&self, source: &S) -> Option<String> {
        source::observe(source, &self.path)
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments.
    let opt = Opt::from_args();

    // Set up logging.
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let mut store = Store::open(&opt.revision_file);
    log::debug!("using revision file {}", store.path().display());

    let stdout = io::stdout();
    let mut output = stdout.lock();

    match &opt.command {
        Command::Diff(artifact) => {
            let observed = artifact.observe(&FileSource);
            session::print_diff(&mut output, &store, &artifact.name(), observed.as_deref())?;
        }
        Command::Update(artifact) => {
            let name = artifact.name();
            writeln!(output, "{} {}", session::MSG_UPDATE, name)?;

            match artifact.observe(&FileSource) {
                Some(text) => {
                    let result = store.update(&name, &text);
                    let failed = result.is_err();
                    session::print_status(
                        &mut output,
                        result,
                        session::MSG_UPDATED,
                        session::MSG_UPDATE_ERROR,
                    )?;
                    if failed {
                        anyhow::bail!("cannot update revision for {}", name);
                    }
                }
                None => anyhow::bail!("cannot read {}", artifact.path.display()),
            }
        }
        Command::DeleteAll => {
            writeln!(output, "{}", session::MSG_DELETE)?;
            let result = store.delete_all();
            let failed = result.is_err();
            session::print_status(
                &mut output,
                result,
                session::MSG_DELETED,
                session::MSG_DELETE_ERROR,
            )?;
            if failed {
                anyhow::bail!("cannot delete revisions from {}", store.path().display());
            }
        }
        Command::ShowOld { name } => {
            writeln!(output, "{}", Detector::new(&store).show_old(name))?;
        }
        Command::ShowNew(artifact) => {
            let observed = artifact.observe(&FileSource);
            writeln!(output, "{}", Detector::new(&store).show_new(observed.as_deref()))?;
        }
        Command::List => list(&mut output, &store)?,
        Command::Check(artifact) => {
            if artifact.path == Path::new("-") {
                anyhow::bail!("check reads answers from stdin, so the artifact must be a file");
            }

            let observed = artifact.observe(&FileSource);
            let stdin = io::stdin();
            session::Session::new(&mut store, stdin.lock(), &mut output)
                .run(&artifact.name(), observed.as_deref())?;
        }
    }

    Ok(())
}

fn list<W: Write>(output: &mut W, store: &Store) -> anyhow::Result<()> {
    match store.last_updated() {
        Some(time) => writeln!(output, "Last revision: {}", time.format(TIME_FORMAT))?,
        None => writeln!(output, "Last revision: None")?,
    }

    for (name, revision) in store.iter() {
        match revision.fingerprint {
            Some(fingerprint) => writeln!(output, "{}\t{}", fingerprint, name)?,
            None => writeln!(output, "None\t{}", name)?,
        }
    }

    Ok(())
}
