use crate::config::WriteOptions;
use crate::error::{Result, ValueError};
use crate::tag::{BaseField, TagFormat};

/// Split a `number/total` pair, empty halves are `None`
pub(crate) fn split_pair(value: &str) -> (Option<&str>, Option<&str>) {
	let mut split = value.splitn(2, '/');

	let number = split.next().map(str::trim).filter(|s| !s.is_empty());
	let total = split.next().map(str::trim).filter(|s| !s.is_empty());

	(number, total)
}

/// Join a number and its total into a `number/total` pair
///
/// Returns `None` when both halves are absent. A present but empty number with no total
/// stays an empty string.
pub(crate) fn join_pair(number: Option<&str>, total: Option<&str>) -> Option<String> {
	match (number, total) {
		(None, None) => None,
		(number, Some(total)) if !total.is_empty() => {
			Some(format!("{}/{}", number.unwrap_or_default(), total))
		},
		(number, _) => Some(number.unwrap_or_default().to_owned()),
	}
}

fn is_numeric(value: &str) -> bool {
	!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn has_leading_zeroes(value: &str) -> bool {
	value.len() >= 2 && value.starts_with('0') && is_numeric(value)
}

/// Render a track/disc number or total for writing
///
/// * `prior` is the value as it was stored in the target tag before the edit
/// * `total` is used to size the padding when leading zeroes are in use
///
/// Non-numeric values are written as-is.
pub(crate) fn render_number(
	format: TagFormat,
	field: BaseField,
	value: &str,
	prior: Option<&str>,
	total: Option<&str>,
	options: &WriteOptions,
) -> Result<String> {
	let value = value.trim();
	if !is_numeric(value) {
		return Ok(value.to_owned());
	}

	let digits = value.trim_start_matches('0');
	let digits = if digits.is_empty() { "0" } else { digits };

	if !options.override_existing_leading_zeroes {
		match prior.map(str::trim) {
			Some(prior) if has_leading_zeroes(prior) => {
				let width = prior.len();
				if digits.len() > width {
					return Err(ValueError::new(
						format,
						format!("{field:?}"),
						"number is wider than its original zero-padded rendering",
					)
					.into());
				}

				return Ok(format!("{digits:0>width$}"));
			},
			Some(prior) if is_numeric(prior) => return Ok(digits.to_owned()),
			_ => {},
		}
	}

	if options.use_leading_zeroes {
		let total_width = total
			.map(str::trim)
			.filter(|t| is_numeric(t))
			.map_or(0, |t| t.trim_start_matches('0').len());

		let width = total_width.max(2);
		return Ok(format!("{digits:0>width$}"));
	}

	Ok(digits.to_owned())
}
