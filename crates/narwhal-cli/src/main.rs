use indexmap::IndexMap;
use narwhal::narwhal_graphlib::{Graph, GraphOptions, Point};
use narwhal::{LayoutOptions, StopPolicy, SweepOrder, Variant};
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Layout(narwhal::Error),
    Input(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Input(msg) => write!(f, "invalid graph: {msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<narwhal::Error> for CliError {
    fn from(value: narwhal::Error) -> Self {
        Self::Layout(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Stress,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    variant: Variant,
    input: Option<String>,
    options_path: Option<String>,
    pretty: bool,
    iterations: Option<usize>,
    epsilon: Option<f64>,
    alpha_step: Option<usize>,
    q: Option<f64>,
    stop_policy: Option<StopPolicy>,
    sweep: Option<SweepOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphIn {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    nodes: Vec<NodeIn>,
    #[serde(default)]
    edges: Vec<EdgeIn>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeIn {
    id: String,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeIn {
    source: String,
    target: String,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    name: Option<String>,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Serialize)]
struct PointOut {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct SummaryOut {
    variant: &'static str,
    iterations: usize,
    stress: f64,
    reason: &'static str,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    positions: IndexMap<&'a str, PointOut>,
    summary: SummaryOut,
}

#[derive(Serialize)]
struct StressOut {
    variant: &'static str,
    stress: f64,
}

fn usage() -> &'static str {
    "narwhal-cli\n\
\n\
USAGE:\n\
  narwhal-cli [layout] [--variant classic|maxent] [--iterations <n>] [--epsilon <e>] [--alpha-step <n>] [--q <q>] [--stop-policy cap|epsilon] [--sweep in-place|snapshot] [--options <json-path>] [--pretty] [<path>|-]\n\
  narwhal-cli stress [--variant classic|maxent] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph JSON is read from stdin.\n\
  - Graph JSON: {\"directed\"?, \"nodes\": [{\"id\", \"x\", \"y\"}], \"edges\": [{\"source\", \"target\", \"weight\"?}]}.\n\
  - Flags override values from --options.\n\
  - Set RUST_LOG (e.g. RUST_LOG=narwhal=debug) for logs on stderr.\n\
"
}

fn flag_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_flag<T: std::str::FromStr>(value: &str) -> Result<T, CliError> {
    value.trim().parse::<T>().map_err(|_| CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "stress" => args.command = Command::Stress,
            "--pretty" => args.pretty = true,
            "--variant" => args.variant = parse_flag(flag_value(&mut it)?)?,
            "--iterations" => args.iterations = Some(parse_flag(flag_value(&mut it)?)?),
            "--epsilon" => args.epsilon = Some(parse_flag(flag_value(&mut it)?)?),
            "--alpha-step" => args.alpha_step = Some(parse_flag(flag_value(&mut it)?)?),
            "--q" => args.q = Some(parse_flag(flag_value(&mut it)?)?),
            "--stop-policy" => args.stop_policy = Some(parse_flag(flag_value(&mut it)?)?),
            "--sweep" => args.sweep = Some(parse_flag(flag_value(&mut it)?)?),
            "--options" => args.options_path = Some(flag_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn build_graph(input: GraphIn) -> Result<Graph, CliError> {
    let mut g = Graph::new(GraphOptions {
        directed: input.directed,
        multigraph: input.multigraph,
    });
    for node in input.nodes {
        if g.has_node(&node.id) {
            return Err(CliError::Input(format!("duplicate node id `{}`", node.id)));
        }
        g.set_node(node.id, Point::new(node.x, node.y));
    }
    for edge in input.edges {
        for end in [&edge.source, &edge.target] {
            if !g.has_node(end) {
                return Err(CliError::Input(format!(
                    "edge {} -> {} references unknown node `{end}`",
                    edge.source, edge.target
                )));
            }
        }
        g.set_edge_named(edge.source, edge.target, edge.name, edge.weight);
    }
    tracing::debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        directed = g.is_directed(),
        "graph loaded"
    );
    Ok(g)
}

fn layout_options(args: &Args) -> Result<LayoutOptions, CliError> {
    let mut opts = match args.options_path.as_deref() {
        Some(path) => serde_json::from_str::<LayoutOptions>(&std::fs::read_to_string(path)?)?,
        None => LayoutOptions::default(),
    };
    opts.iterations = args.iterations.or(opts.iterations);
    opts.epsilon = args.epsilon.or(opts.epsilon);
    opts.alpha_step = args.alpha_step.or(opts.alpha_step);
    opts.q = args.q.or(opts.q);
    opts.stop_policy = args.stop_policy.or(opts.stop_policy);
    opts.sweep = args.sweep.or(opts.sweep);
    Ok(opts)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut graph = build_graph(serde_json::from_str(&text)?)?;

    match args.command {
        Command::Stress => {
            let stress = narwhal::evaluate_stress(&graph, args.variant)?;
            write_json(
                &StressOut {
                    variant: args.variant.name(),
                    stress,
                },
                args.pretty,
            )
        }
        Command::Layout => {
            let opts = layout_options(&args)?;
            let summary = narwhal::layout(&mut graph, args.variant, &opts)?;
            let positions = graph
                .nodes()
                .map(|n| (n.id.as_str(), PointOut { x: n.x, y: n.y }))
                .collect();
            write_json(
                &LayoutOut {
                    positions,
                    summary: SummaryOut {
                        variant: args.variant.name(),
                        iterations: summary.iterations,
                        stress: summary.stress,
                        reason: summary.reason.name(),
                    },
                },
                args.pretty,
            )
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
