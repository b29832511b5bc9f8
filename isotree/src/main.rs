use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use structopt::StructOpt;

use isotree_octree::{corner_key, NodeHandle, Octree, TreeConfig};
use isotree_util::{Edge, Face, Octant};

#[derive(Debug, StructOpt)]
struct Opts {
    /// YAML file describing the tree to build.
    #[structopt(short, long)]
    config: PathBuf,
    #[structopt(subcommand)]
    action: Action,
}

#[derive(Debug, StructOpt)]
enum Action {
    /// Print node, leaf and depth counts.
    Stats {
        /// Also count leaves with the tree cut off at this depth.
        #[structopt(short, long)]
        limit: Option<u32>,
    },
    /// Count the distinct corners shared by the leaves.
    Corners,
    /// Print the depth of every face, edge and corner neighbor of a node.
    Neighbors {
        /// Octant codes leading from the root to the node, e.g. `0,7,3`.
        #[structopt(short, long, use_delimiter = true)]
        path: Vec<u8>,
        /// Refine the tree so every neighbor exists at the node's depth.
        #[structopt(short, long)]
        force: bool,
    },
}

fn load_config(path: &Path) -> Result<TreeConfig> {
    info!("loading tree config from {:?}", path);
    let file = std::fs::File::open(path)
        .context(format!("Opening tree config file {}", path.to_string_lossy()))?;
    let config: TreeConfig = serde_yaml::from_reader(file)?;
    Ok(config)
}

fn run(opt: Opts) -> Result<()> {
    let config = load_config(&opt.config)?;
    let mut tree: Octree<()> = config.build()?;

    match opt.action {
        Action::Stats { limit } => run_stats(&tree, limit),
        Action::Corners => run_corners(&tree, &config),
        Action::Neighbors { path, force } => run_neighbors(&mut tree, &path, force),
    }
}

fn run_stats(tree: &Octree<()>, limit: Option<u32>) -> Result<()> {
    let root = tree.root();
    println!("nodes: {}", tree.nodes(root));
    println!("leaves: {}", tree.leaves(root));
    println!("max depth: {}", tree.max_depth(root));
    if let Some(limit) = limit {
        println!(
            "leaves to depth {}: {}",
            limit,
            tree.max_depth_leaves(root, limit)
        );
    }
    Ok(())
}

fn run_corners(tree: &Octree<()>, config: &TreeConfig) -> Result<()> {
    let root = tree.root();
    let mut keys = HashSet::new();
    for (_, index) in tree.iter_leaves_indexed(root, tree.index_of(root)) {
        for corner in Octant::enumerate().iter() {
            keys.insert(corner_key(index, *corner, config.corner_depth));
        }
    }

    println!(
        "{} leaves share {} distinct corners",
        tree.leaves(root),
        keys.len()
    );
    Ok(())
}

fn run_neighbors(tree: &mut Octree<()>, path: &[u8], force: bool) -> Result<()> {
    let octants = path
        .iter()
        .map(|&code| {
            if (code as usize) < isotree_util::CORNERS {
                Ok(Octant::from_index(code as usize))
            } else {
                Err(anyhow!("Invalid octant code {}", code))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let root = tree.root();
    let node = tree
        .node_at_path(root, &octants)
        .ok_or_else(|| anyhow!("No node at path {:?}", path))?;
    println!("node {:?} at depth {}", tree.index_of(node), tree.depth(node));

    for face in Face::enumerate() {
        let found = if force {
            tree.force_face_neighbor(node, face)?
        } else {
            tree.face_neighbor(node, face)
        };
        report(tree, format!("face {}", face.as_index()), found);
    }

    for edge in Edge::enumerate() {
        let found = if force {
            tree.force_edge_neighbor(node, edge)?
        } else {
            tree.edge_neighbor(node, edge)
        };
        report(tree, format!("edge {}", edge.as_index()), found);
    }

    for corner in Octant::enumerate().iter() {
        let found = if force {
            tree.force_corner_neighbor(node, *corner)?
        } else {
            tree.corner_neighbor(node, *corner)
        };
        report(tree, format!("corner {}", corner.as_index()), found);
    }

    if force {
        info!("tree now has {} nodes", tree.len());
    }
    Ok(())
}

fn report(tree: &Octree<()>, relation: String, found: Option<NodeHandle>) {
    match found {
        None => println!("{:>9}: outside", relation),
        Some(neighbor) => println!(
            "{:>9}: {:?} at depth {}",
            relation,
            tree.index_of(neighbor).offset,
            tree.depth(neighbor)
        ),
    }
}

fn main() {
    env_logger::init();

    match run(Opts::from_args()) {
        Ok(()) => (),
        Err(end_error) => {
            for error in end_error.chain() {
                error!("{}", error);
                error!("========");
            }
        }
    }
}
