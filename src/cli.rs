use crate::playback::DEFAULT_BASE_URL;
use argparse::{ArgumentParser, Store, StoreOption, StoreTrue};
use std::path::PathBuf;

pub struct CliArgs {
    pub schedule: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub day: Option<String>,
    pub mode: String,
    pub at: Option<String>,
    pub tz: Option<String>,
    pub base_url: String,
    pub collection: Option<String>,
    pub grid: bool,
    pub json: bool,
    pub watch: bool,
    pub tick_secs: u64,
    pub ticks: Option<u64>,
    pub log_level: String,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            schedule: None,
            dir: None,
            day: None,
            mode: "clip".into(),
            at: None,
            tz: None,
            base_url: DEFAULT_BASE_URL.into(),
            collection: None,
            grid: false,
            json: false,
            watch: false,
            tick_secs: 30,
            ticks: None,
            log_level: "essential".into(),
        }
    }
}

pub fn parse_cli() -> CliArgs {
    let mut args = CliArgs::default();
    {
        let mut ap = ArgumentParser::new();
        ap.set_description("Scheduled video slot resolver: which clip is on air right now");
        ap.refer(&mut args.schedule)
            .add_argument("schedule", StoreOption, "Schedule TSV file (row 0 is a header)");
        ap.refer(&mut args.dir)
            .add_option(&["--dir"], StoreOption, "Schedule directory with <weekday>.tsv files");
        ap.refer(&mut args.day)
            .add_option(&["--day"], StoreOption, "Weekday to load from --dir (default: today)");
        ap.refer(&mut args.mode)
            .add_option(&["--mode"], Store, "Parse mode: clip|collection");
        ap.refer(&mut args.at)
            .add_option(&["--at"], StoreOption, "Evaluate at this clock time (HH:MM[:SS])");
        ap.refer(&mut args.tz)
            .add_option(&["--tz"], StoreOption, "Timezone (IANA name)");
        ap.refer(&mut args.base_url)
            .add_option(&["--base-url"], Store, "Base URL prepended to clip file names");
        ap.refer(&mut args.collection)
            .add_option(&["--collection"], StoreOption, "Show one collection (and its clips with --dir)");
        ap.refer(&mut args.grid)
            .add_option(&["--grid"], StoreTrue, "Print the day's schedule grid with the now marker");
        ap.refer(&mut args.json)
            .add_option(&["--json"], StoreTrue, "Print results as JSON");
        ap.refer(&mut args.watch)
            .add_option(&["--watch"], StoreTrue, "Keep running and report every slot change");
        ap.refer(&mut args.tick_secs)
            .add_option(&["--tick-secs"], Store, "Tick period in seconds for --watch");
        ap.refer(&mut args.ticks)
            .add_option(&["--ticks"], StoreOption, "Stop --watch after this many ticks");
        ap.refer(&mut args.log_level)
            .add_option(&["--log"], Store, "Log level (essential|debug|trace|warn|error)");
        ap.parse_args_or_exit();
    }
    args
}
