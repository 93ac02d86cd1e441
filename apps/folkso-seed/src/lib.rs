use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use serde::Serialize;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use folkso_domain::{ContentSource, tags::dedup_preserving_order};
use folkso_storage::{
	content,
	db::Db,
	models::{ContentItem, Tag},
	tag_stats, tags,
};

const SLUG_WORDS: [&str; 24] = [
	"archive", "audio", "cooking", "craft", "design", "devops", "fiction", "garden", "hardware",
	"history", "linux", "math", "music", "network", "photo", "poetry", "python", "recipe", "rust",
	"science", "travel", "video", "weather", "webdev",
];
const BATCH_ROWS: u32 = 500;
const MAX_TAGS_PER_ITEM: u64 = 5;

#[derive(Debug, Parser)]
#[command(
	version = folkso_cli::VERSION,
	rename_all = "kebab",
	styles = folkso_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, value_name = "N", default_value_t = 200)]
	pub tags: u32,
	#[arg(long, value_name = "N", default_value_t = 5_000)]
	pub content: u32,
	#[arg(long, value_name = "SEED", default_value_t = 42)]
	pub seed: u64,
	/// Fraction of items landing in the `items` partition; the rest go to `auto`.
	#[arg(long = "source-split", value_name = "FRACTION", default_value_t = 0.8)]
	pub source_split: f64,
}

#[derive(Debug, Serialize)]
struct SeedReport {
	seed: u64,
	tags: u32,
	content: u32,
	attachments: u64,
	items_content: i64,
	auto_content: i64,
	stats_pairs: u64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	if !(0.0..=1.0).contains(&args.source_split) {
		return Err(eyre::eyre!("--source-split must be within [0.0, 1.0]."));
	}
	if args.tags == 0 {
		return Err(eyre::eyre!("--tags must be greater than zero."));
	}

	let config = folkso_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let stream = SeedStream::new(args.seed);
	let now = OffsetDateTime::now_utc();

	seed_tags(&db, &stream, args.tags, now).await?;
	tracing::info!(tags = args.tags, "Seeded tags.");

	let attachments = seed_content(&db, &stream, &args, now).await?;

	tracing::info!(content = args.content, attachments, "Seeded content.");

	let stats_pairs = tag_stats::recompute_tag_stats(&db).await?;
	let report = SeedReport {
		seed: args.seed,
		tags: args.tags,
		content: args.content,
		attachments,
		items_content: content::count_by_source(&db, ContentSource::Items).await?,
		auto_content: content::count_by_source(&db, ContentSource::Auto).await?,
		stats_pairs,
	};
	let json = serde_json::to_string_pretty(&report)?;

	println!("{json}");

	Ok(())
}

/// Deterministic byte stream keyed by the seed and a domain label, so every
/// draw is independent of insertion order and reseeding with the same
/// arguments reproduces the corpus exactly.
struct SeedStream {
	seed: u64,
}
impl SeedStream {
	fn new(seed: u64) -> Self {
		Self { seed }
	}

	fn digest(&self, domain: &str, index: u64) -> [u8; 32] {
		let mut hasher = blake3::Hasher::new();

		hasher.update(&self.seed.to_le_bytes());
		hasher.update(domain.as_bytes());
		hasher.update(&index.to_le_bytes());

		*hasher.finalize().as_bytes()
	}

	fn next_u64(&self, domain: &str, index: u64) -> u64 {
		let digest = self.digest(domain, index);
		let mut word = [0_u8; 8];

		word.copy_from_slice(&digest[..8]);

		u64::from_le_bytes(word)
	}

	/// Uniform in `[0, 1)` with 53 bits of precision.
	fn unit(&self, domain: &str, index: u64) -> f64 {
		(self.next_u64(domain, index) >> 11) as f64 / (1_u64 << 53) as f64
	}
}

fn derived_id(seed: u64, kind: &str, index: u64) -> Uuid {
	let name = format!("folkso-seed:{seed}:{kind}:{index}");

	Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Harmonic weights (1/1, 1/2, 1/3, ...): a popular head and a long rare
/// tail, the cardinality spread the planner is built around.
fn zipf_cumulative(n: usize) -> Vec<f64> {
	let mut acc = 0.0;
	let mut out = Vec::with_capacity(n);

	for rank in 1..=n {
		acc += 1.0 / rank as f64;
		out.push(acc);
	}

	out
}

fn pick_zipf(cumulative: &[f64], unit: f64) -> usize {
	let total = cumulative.last().copied().unwrap_or(1.0);
	let target = unit * total;
	let rank = cumulative.partition_point(|bound| *bound <= target);

	rank.min(cumulative.len().saturating_sub(1))
}

fn pick_word(stream: &SeedStream, domain: &str, index: u64) -> &'static str {
	SLUG_WORDS[(stream.next_u64(domain, index) % SLUG_WORDS.len() as u64) as usize]
}

fn pick_source(stream: &SeedStream, item_index: u64, split: f64) -> ContentSource {
	if stream.unit("source", item_index) < split { ContentSource::Items } else { ContentSource::Auto }
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();

	match chars.next() {
		Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
		None => String::new(),
	}
}

fn build_tag(stream: &SeedStream, index: u32, now: OffsetDateTime) -> Tag {
	let word = pick_word(stream, "tag-word", u64::from(index));

	Tag {
		tag_id: derived_id(stream.seed, "tag", u64::from(index)),
		slug: format!("{word}-{index:04}"),
		display_name: format!("{} #{index:04}", capitalize(word)),
		created_at: now,
	}
}

fn build_item(
	stream: &SeedStream,
	index: u32,
	source: ContentSource,
	now: OffsetDateTime,
) -> ContentItem {
	let item_index = u64::from(index);
	let first = pick_word(stream, "title-a", item_index);
	let second = pick_word(stream, "title-b", item_index);
	let third = pick_word(stream, "title-c", item_index);

	ContentItem {
		content_id: derived_id(stream.seed, "content", item_index),
		source: source.as_str().to_string(),
		title: format!("{first} {second} {third} #{index}"),
		body: format!("Synthetic entry about {first} and {second}."),
		status: "active".to_string(),
		created_at: now,
		updated_at: now,
	}
}

fn draw_tags(stream: &SeedStream, cumulative: &[f64], item_index: u64) -> Vec<Uuid> {
	let count = 1 + stream.next_u64("tag-count", item_index) % MAX_TAGS_PER_ITEM;
	let mut drawn = Vec::with_capacity(count as usize);

	for slot in 0..count {
		let unit = stream.unit("attach", item_index * 16 + slot);
		let rank = pick_zipf(cumulative, unit);

		drawn.push(derived_id(stream.seed, "tag", rank as u64));
	}

	dedup_preserving_order(&drawn)
}

async fn seed_tags(
	db: &Db,
	stream: &SeedStream,
	count: u32,
	now: OffsetDateTime,
) -> color_eyre::Result<()> {
	let mut index = 0_u32;

	while index < count {
		let mut tx = db.pool.begin().await?;
		let upper = count.min(index + BATCH_ROWS);

		while index < upper {
			let tag = build_tag(stream, index, now);

			tags::upsert_tag_tx(&mut tx, &tag).await?;

			index += 1;
		}

		tx.commit().await?;
	}

	Ok(())
}

async fn seed_content(
	db: &Db,
	stream: &SeedStream,
	args: &Args,
	now: OffsetDateTime,
) -> color_eyre::Result<u64> {
	let cumulative = zipf_cumulative(args.tags as usize);
	let mut attachments = 0_u64;
	let mut index = 0_u32;

	while index < args.content {
		let mut tx = db.pool.begin().await?;
		let upper = args.content.min(index + BATCH_ROWS);

		while index < upper {
			let item_index = u64::from(index);
			let source = pick_source(stream, item_index, args.source_split);
			let item = build_item(stream, index, source, now);

			content::upsert_content_tx(&mut tx, &item).await?;

			for tag_id in draw_tags(stream, &cumulative, item_index) {
				content::attach_tag_tx(&mut tx, item.content_id, source, tag_id).await?;

				attachments += 1;
			}

			index += 1;
		}

		tx.commit().await?;
	}

	Ok(attachments)
}
