use anyhow::{Context, Result, ensure};
use tilemosaic_core::{GeoBBox, TileNamePattern, TileRange};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// first corner of the area of interest as "lat,lon", e.g. "35.369656,139.903748"
	#[arg(allow_hyphen_values = true)]
	corner1: String,

	/// opposite corner of the area of interest as "lat,lon"
	#[arg(allow_hyphen_values = true)]
	corner2: String,

	/// zoom level of the tiles
	#[arg(long, short, value_name = "int", display_order = 1)]
	zoom: u8,

	/// print the file name of every tile in the range
	#[arg(long, short, display_order = 2)]
	list: bool,

	/// file extension used for listed tile names. Default: tif
	#[arg(long, value_name = "ext", display_order = 2)]
	extension: Option<String>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let (lat0, lon0) = parse_lat_lon(&arguments.corner1)?;
	let (lat1, lon1) = parse_lat_lon(&arguments.corner2)?;
	let bbox = GeoBBox::from_corners(lon0, lat0, lon1, lat1)?;
	let range = TileRange::from_geo(arguments.zoom, &bbox)?;

	println!("{}", describe(&range));
	if arguments.list {
		let pattern = arguments
			.extension
			.as_deref()
			.map(TileNamePattern::new)
			.unwrap_or_default();
		for name in tile_names(&range, &pattern) {
			println!("{name}");
		}
	}
	Ok(())
}

/// Parses `"lat,lon"` in degrees.
fn parse_lat_lon(text: &str) -> Result<(f64, f64)> {
	let parts: Vec<&str> = text.split(',').map(str::trim).collect();
	ensure!(parts.len() == 2, "expected \"lat,lon\", got {text:?}");
	let lat: f64 = parts[0].parse().with_context(|| format!("parsing latitude in {text:?}"))?;
	let lon: f64 = parts[1].parse().with_context(|| format!("parsing longitude in {text:?}"))?;
	Ok((lat, lon))
}

fn describe(range: &TileRange) -> String {
	format!(
		"zoom {}: x {}..={}, y {}..={}, {} tiles",
		range.level,
		range.x_min,
		range.x_max,
		range.y_min,
		range.y_max,
		range.count_tiles()
	)
}

fn tile_names<'a>(range: &'a TileRange, pattern: &'a TileNamePattern) -> impl Iterator<Item = String> + 'a {
	range.iter_coords().map(|coord| pattern.tile_file_name(&coord))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	#[case("35.5,139.9", (35.5, 139.9))]
	#[case(" -33.9 , 151.2 ", (-33.9, 151.2))]
	fn parse_valid(#[case] text: &str, #[case] expected: (f64, f64)) {
		assert_eq!(parse_lat_lon(text).unwrap(), expected);
	}

	#[rstest]
	#[case("35.5")]
	#[case("35.5,139.9,3")]
	#[case("north,east")]
	fn parse_invalid(#[case] text: &str) {
		assert!(parse_lat_lon(text).is_err());
	}

	#[test]
	fn tokyo_bay_range() {
		let bbox = GeoBBox::from_corners(139.903748, 35.369656, 139.910869, 35.362094).unwrap();
		let range = TileRange::from_geo(20, &bbox).unwrap();
		assert_eq!(describe(&range), "zoom 20: x 931787..=931807, y 414021..=414048, 588 tiles");

		let names: Vec<String> = tile_names(&range, &TileNamePattern::default()).take(2).collect();
		assert_eq!(names, ["tile_z20_x931787_y414021.tif", "tile_z20_x931787_y414022.tif"]);
	}

	#[test]
	fn run_aoi() {
		run_command(vec![
			"tilemosaic",
			"aoi",
			"35.369656,139.903748",
			"35.362094,139.910869",
			"--zoom",
			"20",
			"--list",
		])
		.unwrap();

		assert!(run_command(vec!["tilemosaic", "aoi", "-95,0", "10,10", "-z", "5"]).is_err());
	}
}
