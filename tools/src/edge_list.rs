use anyhow::{bail, Context, Error};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use louvain::{CommunityId, Link, NodeId};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Open `path` for reading, decompressing it if it ends in `.gz`.
pub fn open(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path).with_context(|| path.display().to_string())?;
    if has_extension(path, "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read links from `path`. `.json` files (optionally gzipped) hold an array of tagged links,
/// anything else is a whitespace separated edge list.
pub fn read_links(path: &Path) -> Result<Vec<Link>, Error> {
    let inner = if has_extension(path, "gz") {
        path.file_stem().map(Path::new).unwrap_or(path)
    } else {
        path
    };

    let reader = open(path)?;
    if has_extension(inner, "json") {
        parse_json_links(reader).with_context(|| path.display().to_string())
    } else {
        parse_edge_list(reader).with_context(|| path.display().to_string())
    }
}

/// Parse a JSON array such as `[{"type": "UnweightedLink", "source": 0, "target": 1}]`.
/// Weights must be positive, as in the text format.
pub fn parse_json_links(reader: impl Read) -> Result<Vec<Link>, Error> {
    let links: Vec<Link> = serde_json::from_reader(reader)?;
    for (i, link) in links.iter().enumerate() {
        check_weight(link.weight(), || format!("link {i}"))?;
    }
    Ok(links)
}

fn check_weight(weight: f64, at: impl FnOnce() -> String) -> Result<(), Error> {
    if !(weight > 0.0) {
        bail!("{}: weight must be positive, got {weight}", at());
    }
    Ok(())
}

/// Parse lines of `source target [weight]`. Blank lines and lines starting with `#` are
/// skipped.
pub fn parse_edge_list(reader: impl BufRead) -> Result<Vec<Link>, Error> {
    let mut links = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        let link = match fields.as_slice() {
            [source, target] => Link::unweighted(parse_id(source, i)?, parse_id(target, i)?),
            [source, target, weight] => {
                let weight: f64 = weight
                    .parse()
                    .with_context(|| format!("line {}: bad weight {weight:?}", i + 1))?;
                check_weight(weight, || format!("line {}", i + 1))?;
                Link::weighted(parse_id(source, i)?, parse_id(target, i)?, weight)
            }
            _ => bail!("line {}: expected `source target [weight]`, got {line:?}", i + 1),
        };
        links.push(link);
    }
    Ok(links)
}

fn parse_id(field: &str, line: usize) -> Result<NodeId, Error> {
    field
        .parse()
        .with_context(|| format!("line {}: bad node id {field:?}", line + 1))
}

/// Read a partition written as `node community` lines.
pub fn read_partition(path: &Path) -> Result<BTreeMap<NodeId, CommunityId>, Error> {
    parse_partition(open(path)?).with_context(|| path.display().to_string())
}

/// Parse `node community` lines, skipping blank lines and `#` comments.
pub fn parse_partition(reader: impl BufRead) -> Result<BTreeMap<NodeId, CommunityId>, Error> {
    let mut partition = BTreeMap::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        let [node, community] = fields.as_slice() else {
            bail!("line {}: expected `node community`, got {line:?}", i + 1);
        };
        let community: CommunityId = community
            .parse()
            .with_context(|| format!("line {}: bad community id {community:?}", i + 1))?;
        partition.insert(parse_id(node, i)?, community);
    }
    Ok(partition)
}

/// Write one `node<TAB>community` line per node.
pub fn write_partition(partition: &BTreeMap<NodeId, CommunityId>, writer: &mut impl Write) -> Result<(), Error> {
    for (node, community) in partition {
        writeln!(writer, "{node}\t{community}")?;
    }
    Ok(())
}

/// Write `partition` to `path`, gzipped if it ends in `.gz`.
pub fn write_partition_file(partition: &BTreeMap<NodeId, CommunityId>, path: &Path) -> Result<(), Error> {
    let file = File::create(path).with_context(|| path.display().to_string())?;
    if has_extension(path, "gz") {
        let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));
        write_partition(partition, &mut writer)?;
        writer.into_inner().map_err(|e| e.into_error())?.finish()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_partition(partition, &mut writer)?;
        writer.flush()?;
    }
    Ok(())
}
