#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by the integration tests.
#[cfg(test)]
use {assert_cmd as _, rstest as _, tempfile as _};

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use stac_entity::{Entity, FromJson, Links, RankOptions, SelfHref, ToJson};
use std::{
    fs::File,
    io::{BufWriter, Read, Write},
};
use tracing::metadata::Level;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};
use url::Url;

// Indexed by the number of `-v` flags.
const LOG_LEVELS: [Level; 5] = [
    Level::ERROR,
    Level::WARN,
    Level::INFO,
    Level::DEBUG,
    Level::TRACE,
];

/// stac-entity: Inspect SpatioTemporal Asset Catalog (STAC) JSON
#[derive(Debug, Parser)]
pub struct StacEntity {
    #[command(subcommand)]
    command: Command,

    /// The absolute url of the input.
    ///
    /// Relative hrefs are resolved against this url instead of the href of
    /// the input's `self` link.
    #[arg(long = "url", global = true)]
    url: Option<Url>,

    /// Whether to print compact JSON output.
    ///
    /// By default, JSON output will printed "compact" if it is being output to a file, and printed "pretty" if it is being output to standard output.
    /// Use this argument to force one or the other.
    #[arg(short = 'c', long = "compact-json", global = true)]
    compact_json: Option<bool>,

    /// Log more: warnings with `-v`, up to traces with `-vvvv`.
    ///
    /// Errors are always logged unless `--quiet` is set.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Don't log anything, not even errors.
    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "verbose"
    )]
    quiet: u8,
}

/// A stac-entity subcommand.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reads STAC JSON and writes it back out.
    ///
    /// Fields that aren't understood are kept as they are.
    Translate {
        /// The input file.
        ///
        /// To read from standard input, pass `-` or don't provide an argument at all.
        infile: Option<String>,

        /// The output file.
        ///
        /// To write to standard output, pass `-` or don't provide an argument at all.
        outfile: Option<String>,
    },

    /// Prints a summary of a STAC entity.
    ///
    /// The summary includes the type, id, absolute url, bounding box,
    /// temporal extent, thumbnails, and default GeoTIFF asset.
    Summary {
        /// The input file.
        ///
        /// To read from standard input, pass `-` or don't provide an argument at all.
        infile: Option<String>,
    },

    /// Prints the GeoJSON representation of a STAC entity.
    ///
    /// Catalogs don't have one, so `null` is printed for them.
    Geojson {
        /// The input file.
        ///
        /// To read from standard input, pass `-` or don't provide an argument at all.
        infile: Option<String>,
    },

    /// Ranks the GeoTIFF assets of a STAC entity, best first.
    Rank {
        /// The input file.
        ///
        /// To read from standard input, pass `-` or don't provide an argument at all.
        infile: Option<String>,

        /// Only rank cloud-optimized GeoTIFFs.
        #[arg(long = "cog-only", default_value_t = false)]
        cog_only: bool,

        /// Also rank assets that can't be loaded over http(s).
        #[arg(long = "allow-non-http", default_value_t = false)]
        allow_non_http: bool,
    },
}

impl StacEntity {
    /// Runs this command.
    ///
    /// If `init_tracing_subscriber` is `false`, it is expected that the caller
    /// is setting up the appropriate logging.
    pub fn run(self, init_tracing_subscriber: bool) -> Result<()> {
        if init_tracing_subscriber {
            let level = self
                .log_level()
                .map(LevelFilter::from_level)
                .unwrap_or(LevelFilter::OFF);
            let filter = EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy();
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        match self.command {
            Command::Translate {
                ref infile,
                ref outfile,
            } => {
                let entity = self.get(infile.as_deref())?;
                self.put(outfile.as_deref(), entity.to_json_value()?)
            }
            Command::Summary { ref infile } => {
                let entity = self.get(infile.as_deref())?;
                self.put(None, summary(&entity))
            }
            Command::Geojson { ref infile } => {
                let entity = self.get(infile.as_deref())?;
                let geojson = entity.to_geojson()?.unwrap_or(Value::Null);
                self.put(None, geojson)
            }
            Command::Rank {
                ref infile,
                cog_only,
                allow_non_http,
            } => {
                let entity = self.get(infile.as_deref())?;
                let options = RankOptions {
                    http_only: !allow_non_http,
                    cog_only,
                    ..Default::default()
                };
                let scores: Vec<Value> = entity
                    .rank_geotiffs(&options)
                    .into_iter()
                    .map(|score| json!({"key": score.asset.key(), "score": score.score}))
                    .collect();
                tracing::info!("ranked {} GeoTIFF asset(s)", scores.len());
                self.put(None, Value::Array(scores))
            }
        }
    }

    fn get(&self, href: Option<&str>) -> Result<Entity> {
        let href = href.and_then(|s| if s == "-" { None } else { Some(s) });
        let mut buf = Vec::new();
        if let Some(href) = href {
            tracing::debug!("reading {href}");
            let _ = File::open(href)
                .with_context(|| format!("could not open {href}"))?
                .read_to_end(&mut buf)?;
        } else {
            tracing::debug!("reading standard input");
            let _ = std::io::stdin().read_to_end(&mut buf)?;
        }
        let mut entity = Entity::from_json_slice(&buf)?;
        if let Some(url) = &self.url {
            entity.set_self_href(url);
        }
        tracing::info!(
            "read {} with id {:?}",
            entity.entity_type(),
            entity.id().unwrap_or_default()
        );
        Ok(entity)
    }

    fn put(&self, href: Option<&str>, value: Value) -> Result<()> {
        let href = href.and_then(|s| if s == "-" { None } else { Some(s) });
        if let Some(href) = href {
            let file = File::create(href).with_context(|| format!("could not create {href}"))?;
            let pretty = !self.compact_json.unwrap_or(true);
            value.to_json_writer(BufWriter::new(file), pretty)?;
            Ok(())
        } else {
            let pretty = !self.compact_json.unwrap_or(false);
            let mut bytes = value.to_json_vec(pretty)?;
            bytes.push(b'\n');
            std::io::stdout().write_all(&bytes)?;
            Ok(())
        }
    }

    /// Returns the log level set by `-v` and `-q`.
    pub fn log_level(&self) -> Option<Level> {
        if self.quiet > 0 {
            None
        } else {
            let index = usize::from(self.verbose).min(LOG_LEVELS.len() - 1);
            Some(LOG_LEVELS[index])
        }
    }
}

fn summary(entity: &Entity) -> Value {
    let temporal_extent = entity.temporal_extent().map(|interval| {
        interval.map(|datetime| {
            datetime.map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        })
    });
    let thumbnails: Vec<String> = entity
        .thumbnails(false, None)
        .iter()
        .filter_map(|thumbnail| thumbnail.absolute_url())
        .map(String::from)
        .collect();
    json!({
        "type": entity.entity_type().to_string(),
        "id": entity.id(),
        "absolute_url": entity.absolute_url(),
        "bbox": entity.bounding_box().map(Vec::<f64>::from),
        "temporal_extent": temporal_extent,
        "thumbnails": thumbnails,
        "default_geotiff": entity.default_geotiff(true, false).map(|asset| asset.key().to_string()),
    })
}
