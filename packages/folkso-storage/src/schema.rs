pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_content_items.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_content_items.sql")),
				"tables/002_tags.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_tags.sql")),
				"tables/003_content_tags.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_content_tags.sql")),
				"tables/004_tag_stats.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_tag_stats.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::render_schema;

	#[test]
	fn expands_every_include() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir"), "unexpanded include left in schema");

		for table in ["content_items", "tags", "content_tags", "tag_stats"] {
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
				"schema is missing {table}"
			);
		}
	}
}
