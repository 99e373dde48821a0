use std::env;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::resolve::load_config_with_override;
use crate::config::{CycleCheck, MaxScope, ResolverSettings};
use crate::error::{PkgOrderError, Result};
use crate::graph::ops::{dependents_of, find_cycles, roots};
use crate::graph::resolve::{ResolveError, Resolver};
use crate::graph::{viz, DependencyGraph};
use crate::manifest::{build_graph, load_manifest};
use crate::util::output;

#[derive(Parser, Debug)]
#[command(name = "pkgorder")]
#[command(about = "Package installation order resolver", long_about = None)]
pub struct Cli {
    #[arg(short, long, env = "PKGORDER_MANIFEST", default_value = "packages.json")]
    pub manifest: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub cycle_check: Option<CycleCheck>,
    #[arg(long)]
    pub strict_forest: bool,
    #[arg(long)]
    pub max_scope: Option<MaxScope>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Installation order for one package.
    Order(PackageArgs),
    /// Installation order covering every package.
    All(JsonArgs),
    /// Packages still needed for a package given one already installed.
    ToInstall(ToInstallArgs),
    /// Package with the most transitive dependencies.
    Max(JsonArgs),
    Packages(JsonArgs),
    Deps(PackageArgs),
    Dependents(PackageArgs),
    Show(ShowArgs),
    /// Report dependency cycles anywhere in the graph.
    Check(JsonArgs),
}

#[derive(Args, Debug)]
pub struct JsonArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PackageArgs {
    pub package: String,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ToInstallArgs {
    pub package: String,
    #[arg(long)]
    pub installed: String,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(long, default_value = "tree")]
    pub format: String,
}

#[derive(Serialize)]
struct MaxJson {
    package: String,
    dependency_count: usize,
}

#[derive(Serialize)]
struct GraphJson {
    nodes: Vec<String>,
    edges: Vec<GraphEdge>,
}

#[derive(Serialize)]
struct GraphEdge {
    from: String,
    to: String,
}

#[derive(Serialize)]
struct CheckJson {
    cycles: Vec<Vec<String>>,
}

pub fn run() {
    let cli = Cli::parse();
    output::configure(cli.verbose, cli.quiet, cli.no_color);
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    let graph = load_graph(&cli)?;
    let resolver = Resolver::with_settings(&graph, settings);

    match cli.command {
        Commands::Order(args) => handle_order(args, &resolver),
        Commands::All(args) => handle_all(args, &resolver),
        Commands::ToInstall(args) => handle_to_install(args, &resolver),
        Commands::Max(args) => handle_max(args, &resolver),
        Commands::Packages(args) => handle_packages(args, &graph),
        Commands::Deps(args) => handle_deps(args, &graph),
        Commands::Dependents(args) => handle_dependents(args, &graph),
        Commands::Show(args) => handle_show(args, &graph),
        Commands::Check(args) => handle_check(args, &graph),
    }
}

fn load_settings(cli: &Cli) -> Result<ResolverSettings> {
    let cwd = env::current_dir()?;
    let loaded = load_config_with_override(&cwd, cli.config.clone())?;
    match loaded.path.as_ref() {
        Some(path) => output::detail(&format!("using config {}", path.display())),
        None => output::detail("no config file found, using defaults"),
    }

    let mut settings = loaded.settings;
    if let Some(cycle_check) = cli.cycle_check {
        settings.cycle_check = cycle_check;
    }
    if cli.strict_forest {
        settings.strict_forest = true;
    }
    if let Some(max_scope) = cli.max_scope {
        settings.max_scope = max_scope;
    }
    output::detail(&format!(
        "resolver: cycle_check={} strict_forest={} max_scope={}",
        settings.cycle_check, settings.strict_forest, settings.max_scope
    ));
    Ok(settings)
}

fn load_graph(cli: &Cli) -> Result<DependencyGraph> {
    let manifest = load_manifest(&cli.manifest)?;
    for name in manifest.duplicate_names() {
        output::warn(&format!(
            "package {} is declared more than once; dependencies are merged",
            name
        ));
    }
    let graph = build_graph(&manifest);
    output::detail(&format!(
        "loaded {} packages with {} dependencies from {}",
        graph.order(),
        graph.size(),
        cli.manifest.display()
    ));
    Ok(graph)
}

fn handle_order(args: PackageArgs, resolver: &Resolver<'_>) -> Result<()> {
    let order = resolver.installation_order(&args.package)?;
    print_list(&order, args.json)
}

fn handle_all(args: JsonArgs, resolver: &Resolver<'_>) -> Result<()> {
    let order = resolver.installation_order_for_all()?;
    print_list(&order, args.json)
}

fn handle_to_install(args: ToInstallArgs, resolver: &Resolver<'_>) -> Result<()> {
    let order = resolver.to_install(&args.package, &args.installed)?;
    if order.is_empty() && !args.json {
        output::info(&format!("nothing to install beyond {}", args.installed));
    }
    print_list(&order, args.json)
}

fn handle_max(args: JsonArgs, resolver: &Resolver<'_>) -> Result<()> {
    let max = resolver.package_with_max_dependencies()?;
    if args.json {
        let json = max.map(|max| MaxJson {
            package: max.package,
            dependency_count: max.dependency_count,
        });
        return print_json(&json);
    }

    match max {
        Some(max) => println!("{} ({} dependencies)", max.package, max.dependency_count),
        None => output::info("no packages loaded"),
    }
    Ok(())
}

fn handle_packages(args: JsonArgs, graph: &DependencyGraph) -> Result<()> {
    let mut packages: Vec<String> = graph
        .all_vertices()
        .into_iter()
        .map(str::to_string)
        .collect();
    packages.sort();
    print_list(&packages, args.json)
}

fn handle_deps(args: PackageArgs, graph: &DependencyGraph) -> Result<()> {
    let deps = graph
        .adjacent_vertices_of(&args.package)
        .ok_or_else(|| ResolveError::PackageNotFound(args.package.clone()))?;
    print_list(deps, args.json)
}

fn handle_dependents(args: PackageArgs, graph: &DependencyGraph) -> Result<()> {
    if !graph.contains(&args.package) {
        return Err(ResolveError::PackageNotFound(args.package).into());
    }
    let dependents: Vec<String> = dependents_of(graph, &args.package)
        .into_iter()
        .map(str::to_string)
        .collect();
    print_list(&dependents, args.json)
}

fn handle_show(args: ShowArgs, graph: &DependencyGraph) -> Result<()> {
    let mut starts = roots(graph);
    if starts.is_empty() {
        starts = graph.vertices().iter().map(String::as_str).collect();
    }

    match args.format.to_ascii_lowercase().as_str() {
        "tree" => print!("{}", viz::render_tree(graph, &starts)),
        "flat" => print!("{}", viz::render_flat(graph, &starts)),
        "dot" => print!("{}", viz::render_dot(graph)),
        "json" => print_json(&graph_to_json(graph))?,
        other => {
            return Err(PkgOrderError::Other(anyhow::anyhow!(
                "unknown graph format '{}'",
                other
            )))
        }
    }
    Ok(())
}

fn handle_check(args: JsonArgs, graph: &DependencyGraph) -> Result<()> {
    let cycles = find_cycles(graph);
    if args.json {
        print_json(&CheckJson {
            cycles: cycles.clone(),
        })?;
    } else if cycles.is_empty() {
        output::info("no dependency cycles found");
    } else {
        for cycle in &cycles {
            println!("cycle: {}", cycle.join(", "));
        }
    }

    if cycles.is_empty() {
        Ok(())
    } else {
        Err(PkgOrderError::Other(anyhow::anyhow!(
            "{} dependency cycle(s) found",
            cycles.len()
        )))
    }
}

fn graph_to_json(graph: &DependencyGraph) -> GraphJson {
    let mut edges = Vec::with_capacity(graph.size());
    for vertex in graph.vertices() {
        for dep in graph.adjacent_vertices_of(vertex).unwrap_or_default() {
            edges.push(GraphEdge {
                from: vertex.clone(),
                to: dep.clone(),
            });
        }
    }
    GraphJson {
        nodes: graph.vertices().to_vec(),
        edges,
    }
}

fn print_list(items: &[String], json: bool) -> Result<()> {
    if json {
        return print_json(&items);
    }
    for item in items {
        println!("{}", item);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .map_err(|err| PkgOrderError::Other(anyhow::Error::new(err)))?
    );
    Ok(())
}
