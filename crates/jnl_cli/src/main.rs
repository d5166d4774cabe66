use std::path::PathBuf;

use clap::{command, Parser};

use jnl::{Journal, JnlError};

mod scan;

fn fail(e: JnlError) -> ! {
    eprintln!("jnl: {}", e);
    std::process::exit(1);
}

fn open_journal(root: &PathBuf) -> Journal {
    Journal::open_or_load(root).unwrap_or_else(|e| fail(e))
}

fn save_journal(journal: &Journal) {
    journal.save_to_disk().unwrap_or_else(|e| fail(e));
}

// "name=value" or a bare "name"
fn parse_tag_spec(spec: &str) -> jnl::Tag {
    match spec.split_once('=') {
        Some((name, value)) => jnl::Tag::new(name, value),
        None => jnl::Tag::new(spec, ""),
    }
}

// Original worklog file template: a blank line, the reference line, then one
// tag per line.
fn worklog_contents(guid: &str, tags: &jnl::TagSet) -> String {
    let mut out = String::from("\n");
    out.push_str(&format!("My Reference: {}  \n", guid));
    for tag in tags {
        out.push_str(&format!("{}  \n", tag));
    }
    out
}

fn create_worklog_file(journal: &Journal, path: &jnl::RepoPathBuf) {
    let entry = journal.get(path.as_str()).unwrap_or_else(|e| fail(e));
    let guid = path.file_name().trim_end_matches(".txt");
    let full = journal
        .full_path(path.as_str())
        .unwrap_or_else(|e| fail(e));
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("create worklogs directory");
    }
    std::fs::write(&full, worklog_contents(guid, entry.tags()))
        .expect("write worklog file");
}

#[derive(clap::Args)]
struct InitCommand {}

impl InitCommand {
    fn run(&self, root: &PathBuf) {
        // Keeps any existing snapshot: re-running init must not lose entries
        let journal = open_journal(root);
        save_journal(&journal);
        println!("initialized journal at {}", journal.root().display());
    }
}

#[derive(clap::Args)]
struct NewCommand {
    /// Tags for the new entry, as name or name=value
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl NewCommand {
    fn run(&self, root: &PathBuf) {
        let mut journal = open_journal(root);
        let tags: Vec<jnl::Tag> = self.tags.iter().map(|s| parse_tag_spec(s)).collect();
        let path = journal
            .new_entry(&tags)
            .unwrap_or_else(|e| fail(e))
            .repo_path()
            .clone();
        create_worklog_file(&journal, &path);
        save_journal(&journal);
        println!("{}", path);
    }
}

#[derive(clap::Args)]
struct DailyCommand {}

impl DailyCommand {
    fn run(&self, root: &PathBuf) {
        let mut journal = open_journal(root);
        let today = chrono::Local::now().date_naive();
        let path = journal
            .daily_entry(today)
            .unwrap_or_else(|e| fail(e))
            .repo_path()
            .clone();
        let full = journal.full_path(path.as_str()).unwrap_or_else(|e| fail(e));
        if !full.exists() {
            create_worklog_file(&journal, &path);
        }
        save_journal(&journal);
        println!("{}", path);
    }
}

#[derive(clap::Args)]
struct RegisterCommand {
    path: String,
}

impl RegisterCommand {
    fn run(&self, root: &PathBuf) {
        let mut journal = open_journal(root);
        let registered = journal
            .register(&self.path)
            .unwrap_or_else(|e| fail(e))
            .repo_path()
            .clone();
        save_journal(&journal);
        println!("{}", registered);
    }
}

#[derive(clap::Args)]
struct TagCommand {
    path: String,
    name: String,
    value: Option<String>,
}

impl TagCommand {
    fn run(&self, root: &PathBuf) {
        let mut journal = open_journal(root);
        let value = self.value.as_deref().unwrap_or("");
        let added = journal
            .tag(&self.path, &self.name, value)
            .unwrap_or_else(|e| fail(e));
        if !added {
            println!("already tagged");
        }
        save_journal(&journal);
    }
}

#[derive(clap::Args)]
struct UntagCommand {
    path: String,
    name: String,
    value: Option<String>,
}

impl UntagCommand {
    fn run(&self, root: &PathBuf) {
        let mut journal = open_journal(root);
        let value = self.value.as_deref().unwrap_or("");
        let removed = journal
            .untag(&self.path, &self.name, value)
            .unwrap_or_else(|e| fail(e));
        if !removed {
            println!("no such tag");
        }
        save_journal(&journal);
    }
}

#[derive(clap::Args)]
struct RmCommand {
    path: String,
}

impl RmCommand {
    fn run(&self, root: &PathBuf) {
        let mut journal = open_journal(root);
        let removed = journal.remove(&self.path).unwrap_or_else(|e| fail(e));
        save_journal(&journal);
        println!("removed {}", removed);
    }
}

#[derive(clap::Args)]
struct LsCommand {}

impl LsCommand {
    fn run(&self, root: &PathBuf) {
        let journal = open_journal(root);
        for entry in journal.entries() {
            println!("{}", entry);
        }
    }
}

#[derive(clap::Args)]
struct FindCommand {
    name: String,
    value: Option<String>,
    /// Match entries whose tag value starts with VALUE
    #[arg(long)]
    prefix: bool,
}

impl FindCommand {
    fn run(&self, root: &PathBuf) {
        let journal = open_journal(root);
        let print_all = |entries: &mut dyn Iterator<Item = &jnl::Entry>| {
            for entry in entries {
                println!("{}", entry);
            }
        };
        match (&self.value, self.prefix) {
            (Some(value), true) => print_all(&mut journal.by_tag_prefix(&self.name, value)),
            (Some(value), false) => print_all(&mut journal.by_tag(&self.name, value)),
            (None, _) => print_all(&mut journal.by_tag_name(&self.name)),
        }
    }
}

#[derive(clap::Args)]
struct ScanCommand {}

impl ScanCommand {
    fn run(&self, root: &PathBuf) {
        let mut journal = open_journal(root);
        let added = scan::scan_root(&mut journal).unwrap_or_else(|e| fail(e));
        save_journal(&journal);
        println!("registered {} new entries ({} total)", added, journal.len());
    }
}

#[derive(Parser)]
enum Commands {
    Init(InitCommand),
    New(NewCommand),
    Daily(DailyCommand),
    Register(RegisterCommand),
    Tag(TagCommand),
    Untag(UntagCommand),
    Rm(RmCommand),
    Ls(LsCommand),
    Find(FindCommand),
    Scan(ScanCommand),
}

#[derive(Parser)]
#[command(name = "jnl")]
struct Cli {
    /// Journal root; defaults to $JNL_DIR, then the current directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn journal_root(cli_root: &Option<PathBuf>) -> PathBuf {
    if let Some(root) = cli_root {
        return root.clone();
    }
    if let Ok(dir) = std::env::var("JNL_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_dir().expect("current directory")
}

fn main() {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .expect("logger spec")
        .start()
        .expect("start logger");

    let cli = Cli::parse();
    let root = journal_root(&cli.root);

    match &cli.command {
        Commands::Init(cmd) => cmd.run(&root),
        Commands::New(cmd) => cmd.run(&root),
        Commands::Daily(cmd) => cmd.run(&root),
        Commands::Register(cmd) => cmd.run(&root),
        Commands::Tag(cmd) => cmd.run(&root),
        Commands::Untag(cmd) => cmd.run(&root),
        Commands::Rm(cmd) => cmd.run(&root),
        Commands::Ls(cmd) => cmd.run(&root),
        Commands::Find(cmd) => cmd.run(&root),
        Commands::Scan(cmd) => cmd.run(&root),
    }
}
