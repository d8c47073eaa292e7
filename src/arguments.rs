use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lazy_static::lazy_static;
use regex::Regex;

use crate::result::ResultShape;
use crate::tiler::TILE_SIZE;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Arguments {
    /// Input URLs, data URLs or local file names.
    /// When none is given, they are read from the standard input, one per line.
    pub input_uris: Vec<String>,

    /// File to which the results should be written, one JSON line per image.
    /// Defaults to the standard output.
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,

    /// Width and height of the tiles, in pixels
    #[arg(short = 's', long, default_value_t = TILE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub tile_size: u32,

    /// Layout of the results: 'tiles' lists the position and URL of each tile,
    /// 'urls' gives the size of the image and the list of tile URLs in row-major order
    #[arg(long, default_value = "tiles")]
    pub shape: ResultShape,

    /// A number between 0 and 100 expressing how much to compress the tiles.
    /// 0 means less compression, 100 means more compression.
    #[arg(long, default_value_t = 20)]
    pub compression: u8,

    /// Maximum number of images that are tiled at the same time
    #[arg(short = 'n', long = "parallelism", default_value_t = 4)]
    pub parallelism: usize,

    /// Size, in megabytes, of the in-memory cache of decoded images.
    /// Set it to 0 to load the image again on every request.
    #[arg(long, default_value_t = 512)]
    pub cache_size: u64,

    /// Sets an HTTP header to use on requests.
    /// This option can be repeated in order to set multiple headers.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Maximum time between the beginning of a request and the end of a response before
    /// the request should be interrupted and considered failed
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Time after which we should give up when trying to connect to a server
    #[arg(long = "connect-timeout", default_value = "6s", value_parser = parse_duration)]
    pub connect_timeout: Duration,

    /// Level of logging verbosity. Set it to "debug" to get all logging messages.
    #[arg(long, default_value = "warn")]
    pub logging: String,
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments {
            input_uris: vec![],
            outfile: None,
            tile_size: TILE_SIZE,
            shape: ResultShape::Tiles,
            compression: 20,
            parallelism: 4,
            cache_size: 512,
            headers: vec![],
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(6),
            logging: "warn".to_string(),
        }
    }
}

impl Arguments {
    pub fn headers(&self) -> impl Iterator<Item = (&String, &String)> {
        self.headers.iter().map(|(k, v)| (k, v))
    }
}

fn parse_header(s: &str) -> Result<(String, String), &'static str> {
    let vals: Vec<&str> = s.splitn(2, ':').map(str::trim).collect();
    if let [key, value] = vals[..] {
        Ok((key.into(), value.into()))
    } else {
        Err("Invalid header format. Expected 'Name: Value'")
    }
}

fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^(\d+)\s*(min|s|ms|ns)$").unwrap();
    }
    let err_msg = "Invalid duration. \
                        A duration is a number followed by a unit, such as '10ms' or '5s'";
    let caps = RE.captures(s).ok_or(err_msg)?;
    let val: u64 = caps[1].parse().map_err(|_| err_msg)?;
    match &caps[2] {
        "min" => Ok(Duration::from_secs(60 * val)),
        "s" => Ok(Duration::from_secs(val)),
        "ms" => Ok(Duration::from_millis(val)),
        "ns" => Ok(Duration::from_nanos(val)),
        _ => Err(err_msg)
    }
}

#[test]
fn test_headers_and_input() -> Result<(), clap::Error> {
    let args = Arguments::try_parse_from([
        "tiled-texture",
        "--header",
        "Referer: http://test.com",
        "--header",
        "User-Agent: custom",
        "--header",
        "A:B",
        "--shape",
        "urls",
        "input-url",
        "other.png",
    ])?;
    assert_eq!(args.input_uris, vec!["input-url".to_string(), "other.png".to_string()]);
    assert_eq!(args.shape, ResultShape::Urls);
    assert_eq!(
        args.headers,
        vec![
            ("Referer".into(), "http://test.com".into()),
            ("User-Agent".into(), "custom".into()),
            ("A".into(), "B".into()),
        ]
    );
    Ok(())
}

#[test]
fn test_defaults_match_cli() -> Result<(), clap::Error> {
    let parsed = Arguments::try_parse_from(["tiled-texture"])?;
    let default = Arguments::default();
    assert_eq!(parsed.tile_size, default.tile_size);
    assert_eq!(parsed.shape, default.shape);
    assert_eq!(parsed.compression, default.compression);
    assert_eq!(parsed.parallelism, default.parallelism);
    assert_eq!(parsed.cache_size, default.cache_size);
    assert_eq!(parsed.timeout, default.timeout);
    assert_eq!(parsed.connect_timeout, default.connect_timeout);
    assert_eq!(parsed.logging, default.logging);
    assert!(parsed.input_uris.is_empty());
    Ok(())
}

#[test]
fn test_zero_tile_size_is_rejected() {
    assert!(Arguments::try_parse_from(["tiled-texture", "--tile-size", "0"]).is_err());
    assert!(Arguments::try_parse_from(["tiled-texture", "--shape", "grid"]).is_err());
}

#[test]
fn test_parse_duration() {
    assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
    assert_eq!(parse_duration("29 s"), Ok(Duration::from_secs(29)));
    assert_eq!(parse_duration("2min"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1000 ms"), Ok(Duration::from_secs(1)));
    assert!(parse_duration("1 2 ms").is_err());
    assert!(parse_duration("1 s s").is_err());
    assert!(parse_duration("ms").is_err());
    assert!(parse_duration("1j").is_err());
    assert!(parse_duration("").is_err());
}
