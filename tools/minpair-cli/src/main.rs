use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use minpair_conllu::Reader;
use minpair_engine::{
    eligible, retain_eligible, select_threshold, GenerationReport, Generator, GeneratorConfig, ModelScores, Resources,
};
use minpair_protocol::{MinimalPair, Phenomenon, ResourceBundle};
use minpair_syntax::AnnotatedSentence;
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Russian minimal-pair generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a JSON resource bundle into the rkyv archive `generate` loads.
    Compile {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Perturb a CoNLL-U treebank and write minimal pairs as JSON lines.
    Generate(GenerateArgs),
    /// Keep only pairs whose sentences fall under the contamination threshold.
    Threshold {
        /// JSON array of per-model sentence scores.
        #[arg(short, long, value_name = "FILE")]
        scores: PathBuf,
        /// Wanted number of sentences shared by every model.
        #[arg(short, long)]
        target: usize,
        /// Pairs to filter, as written by `generate`.
        #[arg(long, value_name = "FILE")]
        pairs: Option<PathBuf>,
        #[arg(short, long, value_name = "FILE", requires = "pairs")]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
    /// Compiled resource archive.
    #[arg(short, long, value_name = "FILE")]
    resources: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
    /// Phenomenon ids, comma separated; all of them when omitted.
    #[arg(long, value_delimiter = ',')]
    phenomena: Vec<Phenomenon>,
    #[arg(long)]
    domain: Option<String>,
    #[arg(long)]
    max_sentences: Option<usize>,
    #[arg(long)]
    threads: Option<usize>,
    /// JSON run settings; flags take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Also write the run report as JSON.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Count sentences with a broken tree and go on instead of stopping.
    #[arg(long)]
    skip_malformed: bool,
}

impl GenerateArgs {
    fn config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => GeneratorConfig::default(),
        };
        if !self.phenomena.is_empty() {
            config.phenomena = self.phenomena.clone();
        }
        if self.domain.is_some() {
            config.domain = self.domain.clone();
        }
        if self.max_sentences.is_some() {
            config.max_sentences = self.max_sentences;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    match Cli::parse().command {
        Command::Compile { input, output } => compile(&input, &output),
        Command::Generate(args) => generate(&args),
        Command::Threshold {
            scores,
            target,
            pairs,
            output,
        } => threshold(&scores, target, pairs.as_deref(), output.as_deref()),
    }
}

fn compile(input: &Path, output: &Path) -> anyhow::Result<()> {
    info!(input = %input.display(), "reading resource bundle");
    let text = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let bundle: ResourceBundle = serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))?;

    // Fails on dangling references before anything is written.
    Resources::load(&bundle).context("bundle does not load")?;
    info!(
        lemmas = bundle.dictionary.lemmas.len(),
        concepts = bundle.semantics.concepts.len(),
        frequencies = bundle.frequencies.len(),
        "compiling"
    );

    let mut serializer = AllocSerializer::<256>::default();
    serializer
        .serialize_value(&bundle)
        .map_err(|e| anyhow::anyhow!("rkyv serialization failed: {e:?}"))?;
    let bytes = serializer.into_serializer().into_inner();
    fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;

    info!(output = %output.display(), bytes = bytes.len(), "archive written");
    Ok(())
}

fn generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring worker threads")?;
    }

    let archive = fs::read(&args.resources).with_context(|| format!("reading {}", args.resources.display()))?;
    let bundle = Resources::bundle_from_archive(&archive)?;
    let (resources, lexicon) = Resources::load(&bundle)?;

    let text = fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let (sentences, malformed) = read_treebank(&text, &config, args.skip_malformed)
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!(sentences = sentences.len(), malformed, "treebank read");

    let generator = Generator::from_config(&lexicon, &resources, &config);
    let (pairs, mut report) = generator.generate(&sentences);
    report.malformed += malformed;

    write_pairs(&args.output, &pairs)?;
    summarize(&report);
    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

/// Sentences of a CoNLL-U document, up to the configured limit. A broken tree stops
/// the read unless `skip_malformed` is set, in which case it is counted.
fn read_treebank(
    text: &str,
    config: &GeneratorConfig,
    skip_malformed: bool,
) -> anyhow::Result<(Vec<AnnotatedSentence>, usize)> {
    let limit = config.max_sentences.unwrap_or(usize::MAX);
    let mut sentences = Vec::new();
    let mut malformed = 0;
    for result in Reader::new(text, config.domain.clone()) {
        if sentences.len() >= limit {
            break;
        }
        match result {
            Ok(sentence) => sentences.push(sentence),
            Err(e) if skip_malformed && e.is_sentence_local() => {
                warn!(error = %e, "skipping sentence");
                malformed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok((sentences, malformed))
}

fn summarize(report: &GenerationReport) {
    for (phenomenon, counts) in &report.per_phenomenon {
        info!(
            phenomenon = phenomenon.as_str(),
            candidates = counts.candidates,
            emitted = counts.emitted,
            "phenomenon"
        );
    }
    info!(
        sentences = report.sentences,
        malformed = report.malformed,
        emitted = report.emitted,
        rejected = report.rejected,
        duplicates = report.duplicates,
        "run finished"
    );
}

fn threshold(scores: &Path, target: usize, pairs: Option<&Path>, output: Option<&Path>) -> anyhow::Result<()> {
    let text = fs::read_to_string(scores).with_context(|| format!("reading {}", scores.display()))?;
    let pools: Vec<ModelScores> = serde_json::from_str(&text).with_context(|| format!("parsing {}", scores.display()))?;

    let threshold = select_threshold(&pools, target)?;
    let allowed = eligible(&pools, &threshold)?;
    info!(value = threshold.value, size = threshold.size, "threshold selected");
    println!("{}", serde_json::to_string(&threshold)?);

    let Some(pairs_path) = pairs else {
        return Ok(());
    };
    let mut kept = read_pairs(pairs_path)?;
    let dropped = retain_eligible(&mut kept, &allowed);
    info!(kept = kept.len(), dropped, "pairs filtered");
    match output {
        Some(path) => write_pairs(path, &kept),
        None => bail!("--output is required with --pairs"),
    }
}

fn read_pairs(path: &Path) -> anyhow::Result<Vec<MinimalPair>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| serde_json::from_str(line).with_context(|| format!("{}:{}", path.display(), n + 1)))
        .collect()
}

fn write_pairs(path: &Path, pairs: &[MinimalPair]) -> anyhow::Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for pair in pairs {
        serde_json::to_writer(&mut out, pair)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    info!(path = %path.display(), pairs = pairs.len(), "pairs written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("minpair-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"phenomena": ["verb_tense"], "domain": "news", "threads": 2}"#).unwrap();
        let cli = Cli::try_parse_from([
            "minpair",
            "generate",
            "-i",
            "in.conllu",
            "-r",
            "res.rkyv",
            "-o",
            "out.jsonl",
            "--phenomena",
            "np_agreement_case,deontic_imp",
            "--max-sentences",
            "10",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = args.config().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.phenomena, vec![Phenomenon::NpCase, Phenomenon::DeonticImperfective]);
        assert_eq!(config.domain.as_deref(), Some("news"));
        assert_eq!(config.max_sentences, Some(10));
        assert_eq!(config.threads, Some(2));
    }

    #[test]
    fn test_unknown_phenomenon_is_a_usage_error() {
        let parsed = Cli::try_parse_from([
            "minpair",
            "generate",
            "-i",
            "a",
            "-r",
            "b",
            "-o",
            "c",
            "--phenomena",
            "np_agreement_tense",
        ]);
        assert!(parsed.is_err());
    }

    const BROKEN: &str = "\
# sent_id = two-roots
1\tа\tа\tCCONJ\t_\t_\t0\troot\t_\t_
2\tб\tб\tCCONJ\t_\t_\t0\troot\t_\t_

# sent_id = fine
1\tДа\tда\tINTJ\t_\t_\t0\troot\t_\t_
";

    #[test]
    fn test_broken_tree_stops_the_read() {
        let err = read_treebank(BROKEN, &GeneratorConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("two-roots"));
    }

    #[test]
    fn test_skip_malformed_counts_and_goes_on() {
        let (sentences, malformed) = read_treebank(BROKEN, &GeneratorConfig::default(), true).unwrap();
        assert_eq!(malformed, 1);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].id(), "fine");

        let cli = Cli::try_parse_from([
            "minpair", "generate", "-i", "a", "-r", "b", "-o", "c", "--skip-malformed",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.skip_malformed);
    }

    #[test]
    fn test_output_requires_pairs() {
        assert!(Cli::try_parse_from(["minpair", "threshold", "-s", "x.json", "-t", "3", "-o", "y"]).is_err());
    }
}
