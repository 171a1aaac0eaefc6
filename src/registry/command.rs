use std::borrow::Cow;
use std::path::Path;

/// Values available for substitution into a rule's `command` template.
pub struct CommandContext<'a> {
	pub source: &'a Path,
	pub dest: &'a Path,
	pub temp: &'a Path,
	pub mime_type: &'a str,
	pub pid: u32,
}

fn quote(path: &Path) -> String {
	shell_escape::escape(Cow::Borrowed(path.to_string_lossy().as_ref())).into_owned()
}

/// Substitute the placeholders a converter rule's `command` template may
/// reference. Paths are shell-quoted; `<mime-type>` and `<pid>` are not,
/// since they never contain shell metacharacters in practice.
pub fn build_command(template: &str, ctx: &CommandContext) -> String {
	let stem = ctx
		.dest
		.file_stem()
		.map(|s| s.to_string_lossy().into_owned())
		.unwrap_or_default();
	let source_parent = ctx.source.parent().unwrap_or_else(|| Path::new("."));
	let dest_parent = ctx.dest.parent().unwrap_or_else(|| Path::new("."));

	template
		.replace("<source-parent>", &quote(source_parent))
		.replace("<dest-parent>", &quote(dest_parent))
		.replace("<source>", &quote(ctx.source))
		.replace("<dest>", &quote(ctx.dest))
		.replace("<temp>", &quote(ctx.temp))
		.replace("<mime-type>", ctx.mime_type)
		.replace("<pid>", &ctx.pid.to_string())
		.replace("<stem>", &stem)
}
