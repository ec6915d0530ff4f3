use anyhow::{bail, Context};
use api_shared::PreferenceSet;
use clap::{Args, Parser, Subcommand};
use medref_client::draft::{DraftStore, FileStorage, LocalStorage, MemoryStorage};
use medref_client::hpi_form::{HpiField, HpiForm, ResultArea};
use medref_client::render::{category_label, ordered_categories};
use medref_client::{ApiClient, Event, Session};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medref")]
#[command(about = "MedRef clinical reference CLI")]
struct Cli {
    /// Base URL of the MedRef server
    #[arg(long, env = "MEDREF_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server is up
    Health,
    /// List providers, sorted by first name
    Providers {
        /// Only show providers whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one provider's preferences
    Prefs {
        /// Provider identifier
        id: String,
    },
    /// Look up a medication by name
    Lookup {
        /// Medication name, any case
        name: String,
    },
    /// Autocomplete suggestions for a search term
    Suggest {
        /// Search term
        query: String,
    },
    /// Draft an HPI from clinical fields
    Hpi(HpiArgs),
    /// Remove the saved HPI draft
    ClearDraft {
        /// Directory holding the saved draft
        #[arg(long, env = "MEDREF_DRAFT_DIR")]
        draft_dir: PathBuf,
    },
}

#[derive(Args)]
struct HpiArgs {
    /// Chief complaint (required unless restored from a draft)
    #[arg(long)]
    chief_complaint: Option<String>,
    /// Narrative context (required unless restored from a draft)
    #[arg(long)]
    narrative: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    /// Past medical history
    #[arg(long)]
    pmh: Option<String>,
    /// Onset and timing
    #[arg(long)]
    onset: Option<String>,
    /// Who accompanied the patient
    #[arg(long)]
    accompanied_by: Option<String>,
    #[arg(long)]
    additional_symptoms: Option<String>,
    #[arg(long)]
    pertinent_negatives: Option<String>,
    /// Current medications
    #[arg(long)]
    medications: Option<String>,
    /// Keep the form as a draft in this directory
    #[arg(long, env = "MEDREF_DRAFT_DIR")]
    draft_dir: Option<PathBuf>,
}

impl HpiArgs {
    fn values(&self) -> Vec<(HpiField, &str)> {
        [
            (HpiField::ChiefComplaint, &self.chief_complaint),
            (HpiField::OtherNotes, &self.narrative),
            (HpiField::Gender, &self.gender),
            (HpiField::PastMedicalHistory, &self.pmh),
            (HpiField::OnsetTiming, &self.onset),
            (HpiField::AccompaniedBy, &self.accompanied_by),
            (HpiField::AdditionalSymptoms, &self.additional_symptoms),
            (HpiField::PertinentNegatives, &self.pertinent_negatives),
            (HpiField::CurrentMedications, &self.medications),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

fn print_preferences(prefs: &PreferenceSet) {
    for key in ordered_categories(prefs) {
        println!("{}:", category_label(key));
        match prefs.get(key) {
            Some(serde_json::Value::Array(items)) if !items.is_empty() => {
                for item in items {
                    match item.as_str() {
                        Some(text) => println!("  - {}", text),
                        None => println!("  - {}", item),
                    }
                }
            }
            Some(serde_json::Value::String(text)) => println!("  {}", text),
            _ => println!("  No specific preferences."),
        }
    }
}

async fn run_hpi<S: LocalStorage>(
    client: &ApiClient,
    args: &HpiArgs,
    drafts: DraftStore<S>,
) -> anyhow::Result<()> {
    let mut form = HpiForm::open(drafts);
    let now = Instant::now();
    for (field, value) in args.values() {
        form.set(field, value, now);
    }
    form.tick(now + medref_client::hpi_form::SAVE_DEBOUNCE);

    if !form.submit(client, now).await {
        let missing: Vec<&str> = HpiField::REQUIRED
            .into_iter()
            .filter(|f| form.is_highlighted(*f, now))
            .map(|f| f.label())
            .collect();
        bail!("missing required fields: {}", missing.join(", "));
    }

    match form.result() {
        ResultArea::Generated(text) => println!("{}", text),
        ResultArea::Failed(text) => bail!("{}", text),
        ResultArea::Empty | ResultArea::Generating => bail!("no HPI was generated"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medref_client=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("using server {}", cli.server);
    let client = ApiClient::new(&cli.server).context("invalid --server")?;

    match cli.command {
        Some(Commands::Health) => {
            let health = client.health().await?;
            println!("{}", health.message);
        }
        Some(Commands::Providers { filter }) => {
            let mut session = Session::new(client);
            session.dispatch(Event::Start).await;
            if let Some(filter) = filter {
                session.dispatch(Event::ProviderFilterChanged(filter)).await;
            }
            let list = session.state().providers();
            if list.error_html().is_some() {
                bail!("failed to load providers");
            }
            let visible = list.visible();
            if visible.is_empty() {
                println!("No providers found.");
            }
            for provider in visible {
                println!("{}\t{}", provider.id, provider.name);
            }
        }
        Some(Commands::Prefs { id }) => {
            let prefs = client.provider_preferences(&id).await?;
            print_preferences(&prefs);
        }
        Some(Commands::Lookup { name }) => {
            let med = client.medication(&name).await?;
            println!("{}", med.name);
            println!();
            println!("Overview: {}", med.description);
            if !med.alternate_names.is_empty() {
                println!("Alternative names: {}", med.alternate_names.join(", "));
            }
            if !med.mechanism_of_action.is_empty() {
                println!("Mechanism of Action: {}", med.mechanism_of_action);
            }
        }
        Some(Commands::Suggest { query }) => {
            let suggestions = client.suggestions(&query).await?;
            if suggestions.is_empty() {
                println!("No suggestions.");
            }
            for pair in suggestions {
                if pair.canonical().eq_ignore_ascii_case(pair.matched()) {
                    println!("{}", pair.canonical());
                } else {
                    println!("{} ({})", pair.canonical(), pair.matched());
                }
            }
        }
        Some(Commands::Hpi(args)) => match &args.draft_dir {
            Some(dir) => {
                run_hpi(&client, &args, DraftStore::new(FileStorage::new(dir))).await?;
            }
            None => {
                run_hpi(&client, &args, DraftStore::new(MemoryStorage::new())).await?;
            }
        },
        Some(Commands::ClearDraft { draft_dir }) => {
            DraftStore::new(FileStorage::new(&draft_dir)).clear()?;
            println!("Draft cleared.");
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
