//! hidled-ctl - drive the LED controller from a desktop host.
//!
//! ```text
//! hidled-ctl set 1 0 1 0        # LED1 and LED3 on, wait for the status byte
//! hidled-ctl chase --rounds 2   # light each LED in turn
//! hidled-ctl list               # show matching devices
//! ```

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use hidapi::HidApi;
use hidled::config::{LED_COUNT, USB_PID, USB_VID};
use hidled::host::{ClientConfig, HostResult, LedClient};
use hidled::{LedCommand, Status};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hidled-ctl", about = "Control the four LEDs of a hidled device")]
struct Cli {
    /// Vendor ID (hex) [default: 0x1234]
    #[arg(long, value_parser = parse_hex_u16)]
    vid: Option<u16>,
    /// Product ID (hex) [default: 0x0006]
    #[arg(long, value_parser = parse_hex_u16)]
    pid: Option<u16>,
    /// How long to wait for each status byte, in milliseconds
    #[arg(long, default_value = "1000")]
    timeout_ms: u64,
    /// Extra attempts for a failed write
    #[arg(long, default_value = "0")]
    retries: u32,
    /// Verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set all four LEDs: 1 = on, 0 = off, LED1 first
    Set {
        #[arg(num_args = LED_COUNT, value_parser = parse_level, required = true)]
        levels: Vec<bool>,
    },
    /// Light one LED at a time, LED1 to LED4
    Chase {
        /// Number of passes over the four LEDs
        #[arg(long, default_value = "1")]
        rounds: u32,
        /// Time each LED stays lit, in milliseconds
        #[arg(long, default_value = "250")]
        delay_ms: u64,
    },
    /// List connected devices matching the VID/PID
    List,
}

impl Cli {
    fn vid(&self) -> u16 {
        self.vid.unwrap_or(USB_VID)
    }

    fn pid(&self) -> u16 {
        self.pid.unwrap_or(USB_PID)
    }
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

fn parse_level(s: &str) -> Result<bool, String> {
    match s {
        "1" | "on" => Ok(true),
        "0" | "off" => Ok(false),
        other => Err(format!("invalid LED level '{other}', expected 1/0 or on/off")),
    }
}

/// A connected client plus the channel its IO thread reports into.
struct Session {
    client: LedClient,
    statuses: crossbeam::channel::Receiver<HostResult<Status>>,
    timeout: Duration,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let config = ClientConfig {
            vendor_id: cli.vid(),
            product_id: cli.pid(),
            write_retries: cli.retries,
            ..Default::default()
        };
        let (tx, statuses) = crossbeam::channel::unbounded();
        let client = LedClient::open(tx, config).with_context(|| {
            format!("Failed to open device VID=0x{:04X} PID=0x{:04X}", cli.vid(), cli.pid())
        })?;

        Ok(Self {
            client,
            statuses,
            timeout: Duration::from_millis(cli.timeout_ms),
        })
    }

    /// Send `command` and wait for the device to acknowledge it.
    fn send(&self, command: LedCommand) -> Result<()> {
        self.client.write_async(command)?;
        let status = self
            .statuses
            .recv_timeout(self.timeout)
            .context("No status from device")??;

        match status {
            Status::Success => Ok(()),
            Status::Error => bail!("Device rejected {:?}", command.encode()),
        }
    }

    fn close(self) {
        self.client.close();
    }
}

fn set_leds(cli: &Cli, levels: &[bool]) -> Result<()> {
    let levels: [bool; LED_COUNT] = levels
        .try_into()
        .map_err(|_| anyhow!("expected {LED_COUNT} LED levels, got {}", levels.len()))?;

    let session = Session::open(cli)?;
    let result = session.send(LedCommand::new(levels));
    session.close();
    result?;

    println!("LEDs set to {:?}", LedCommand::new(levels).encode());
    Ok(())
}

fn chase(cli: &Cli, rounds: u32, delay: Duration) -> Result<()> {
    let session = Session::open(cli)?;
    for _ in 0..rounds {
        for led in 0..LED_COUNT {
            let mut levels = [false; LED_COUNT];
            levels[led] = true;
            session.send(LedCommand::new(levels))?;
            std::thread::sleep(delay);
        }
    }
    session.send(LedCommand::default())?;
    session.close();
    Ok(())
}

fn list_devices(vid: u16, pid: u16) -> Result<()> {
    let api = HidApi::new().context("Failed to initialise hidapi")?;
    let devices: Vec<_> = api
        .device_list()
        .filter(|d| d.vendor_id() == vid && d.product_id() == pid)
        .collect();

    if devices.is_empty() {
        println!("No device with VID=0x{vid:04X} PID=0x{pid:04X} found.");
        return Ok(());
    }
    for dev in devices {
        println!(
            "0x{:04X}:0x{:04X}  {:<20} {:<20} {}",
            dev.vendor_id(),
            dev.product_id(),
            dev.manufacturer_string().unwrap_or("(unknown)"),
            dev.product_string().unwrap_or("(unknown)"),
            dev.path().to_string_lossy(),
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hidled={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Commands::Set { levels } => set_leds(&cli, levels),
        Commands::Chase { rounds, delay_ms } => {
            chase(&cli, *rounds, Duration::from_millis(*delay_ms))
        }
        Commands::List => list_devices(cli.vid(), cli.pid()),
    }
}
