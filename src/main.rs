//! Checkout Rush headless runner
//!
//! Stands up a small store (one pad, a row of shelf slots), then plays a
//! scripted shopper who carries items to the pad until the requested number
//! of rounds is over. Feedback goes to the log.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

use checkout_rush::consts::*;
use checkout_rush::sim::{EntityId, GameState, TickInput, WorldPositions, tick};
use checkout_rush::{Catalog, LogBridge, MatchOrder, Settings};

/// Where the scan pad sits
const PAD_POSITION: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Nominal pad radius
const PAD_RADIUS: f32 = 0.15;
/// Seconds the shopper takes to walk an item from shelf to pad
const CARRY_SECS: f32 = 1.2;
/// Render frame time the host runs at (simulation substeps at SIM_DT)
const FRAME_DT: f32 = 1.0 / 72.0;
/// Give up on a round that never ends
const MAX_SECS_PER_ROUND: f64 = 120.0;

/// Checkout Rush - headless scan-and-round runner
#[derive(Parser, Debug)]
#[command(name = "checkout-rush", version, about)]
struct Args {
    /// Path to a settings JSON file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Path to a catalog JSON file
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Candidate policy when several items sit on the pad (first, nearest)
    #[arg(short = 'm', long = "match", value_parser = parse_match_order)]
    match_order: Option<MatchOrder>,

    /// Number of rounds to play
    #[arg(short, long, default_value_t = 1)]
    rounds: u32,
}

fn parse_match_order(name: &str) -> Result<MatchOrder, String> {
    MatchOrder::from_str(name).ok_or_else(|| format!("unknown match order: {}", name))
}

/// Scripted shopper walking items to the pad
struct Shopper {
    slots: Vec<Vec3>,
    next_slot: usize,
    carrying: Option<(EntityId, Vec3, f32)>,
}

impl Shopper {
    fn new(slots: Vec<Vec3>) -> Self {
        Self {
            slots,
            next_slot: 0,
            carrying: None,
        }
    }

    /// Move the carried item along; pick up the next one when hands are empty
    fn update(&mut self, state: &GameState, world: &mut WorldPositions, dt: f32) {
        // Sold items drop out of tracking once restocked
        if let Some((id, _, _)) = self.carrying {
            if state.object(id).is_none_or(|o| o.retired) {
                self.carrying = None;
            }
        }

        if self.carrying.is_none() {
            let slot = self.slots[self.next_slot];
            self.next_slot = (self.next_slot + 1) % self.slots.len();
            if let Some(object) = state.live_objects().find(|o| o.home_slot == slot) {
                self.carrying = Some((object.id, object.home_slot, 0.0));
            }
        }

        if let Some((id, from, progress)) = self.carrying.as_mut() {
            *progress = (*progress + dt / CARRY_SECS).min(1.0);
            world.set(*id, from.lerp(PAD_POSITION, *progress));
        }
    }
}

/// Host loop state
struct Demo {
    state: GameState,
    world: WorldPositions,
    pad: EntityId,
    shopper: Shopper,
    bridge: LogBridge,
    accumulator: f32,
    now: f64,
}

impl Demo {
    fn new(settings: Settings, catalog: Catalog) -> Result<Self, Box<dyn Error>> {
        let mut state = GameState::new(settings, catalog)?;
        let pad = state
            .add_zone(PAD_RADIUS)
            .ok_or("scan pad radius must be positive")?;

        let slots: Vec<Vec3> = (0..5)
            .map(|i| Vec3::new(-1.0 + i as f32 * 0.5, 1.2, 1.5))
            .collect();
        state.stock_slots(&slots);

        let mut world = WorldPositions::new();
        world.set(pad, PAD_POSITION);
        world.place_at_home(&state.objects);

        Ok(Self {
            state,
            world,
            pad,
            shopper: Shopper::new(slots),
            bridge: LogBridge,
            accumulator: 0.0,
            now: 0.0,
        })
    }

    /// Run simulation ticks for one rendered frame
    fn update(&mut self, frame_dt: f32) {
        self.accumulator += frame_dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.shopper.update(&self.state, &mut self.world, SIM_DT);
            self.now += SIM_DT as f64;

            let input = TickInput {
                dt: SIM_DT,
                now: self.now,
                world: &self.world,
            };
            let report = tick(&mut self.state, &input, &mut self.bridge);

            if !report.spawned.is_empty() {
                self.world.place_at_home(&self.state.objects);
                self.world.retain_tracked(&self.state.objects, &[self.pad]);
            }

            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(order) = args.match_order {
        settings.match_order = order;
    }
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::default(),
    };

    log::info!(
        "Checkout Rush starting: {} items, {}s rounds, goal ${:.2}, match {}",
        catalog.len(),
        settings.round_duration_secs,
        settings.goal_value,
        settings.match_order.as_str()
    );

    let mut demo = Demo::new(settings, catalog)?;
    let deadline = MAX_SECS_PER_ROUND * args.rounds as f64;
    while demo.state.history.rounds_played() < args.rounds && demo.now < deadline {
        demo.update(FRAME_DT);
    }

    let history = &demo.state.history;
    println!(
        "Played {} round(s), won {}",
        history.rounds_played(),
        history.rounds_won()
    );
    for (rank, entry) in history.entries.iter().enumerate() {
        println!(
            "  #{} round {}: ${:.2} from {} items{}",
            rank + 1,
            entry.round_number,
            entry.cart_total,
            entry.scanned_count,
            if entry.won { " (won)" } else { "" }
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
