//! Headless particle workload driving the heap one frame at a time
//!
//! Each frame publishes input state into a rooted global scope, spawns
//! particles backed by foreign pointers, advances them, and drops the ones
//! whose life ran out. Dead particles are left for the collector, which
//! hands their boxed state to the finalizer.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use scopegc::logging::{self, debug, error, info, warn};
use scopegc::{ForeignPointer, Heap, HeapConfig, HeapResult, ObjRef};

const PARTICLE_TAG: usize = 0xB0B;
const FIXED_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;

#[derive(Debug)]
struct Config {
    frames: u32,
    spawn: u32,
    life: u32,
    seedless: bool,
}

impl Config {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let prog = args.first().map(String::as_str).unwrap_or("scopegc-sim");

        let mut config = Self {
            frames: 600,
            spawn: 100,
            life: 120,
            seedless: false,
        };

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(Self::usage(prog)),
                "--seedless" => config.seedless = true,
                "--frames" => config.frames = Self::number(arg, iter.next())?,
                "--spawn" => config.spawn = Self::number(arg, iter.next())?,
                "--life" => config.life = Self::number(arg, iter.next())?,
                opt => return Err(format!("Unknown option: {}\n\n{}", opt, Self::usage(prog))),
            }
        }

        if config.life == 0 {
            return Err("--life must be at least 1".to_string());
        }

        Ok(config)
    }

    fn number(flag: &str, value: Option<&String>) -> Result<u32, String> {
        let value = value.ok_or_else(|| format!("{} expects a value", flag))?;
        value
            .parse()
            .map_err(|_| format!("{} expects a number, got '{}'", flag, value))
    }

    fn usage(prog: &str) -> String {
        format!(
            "scopegc-sim - headless heap workload\n\n\
            USAGE:\n    {} [OPTIONS]\n\n\
            OPTIONS:\n    \
            -h, --help      Print help information\n    \
            --frames N      Frames to simulate (default 600)\n    \
            --spawn N       Particles spawned per spawning frame (default 100)\n    \
            --life N        Frames a particle lives (default 120)\n    \
            --seedless      Seed the generator from the wall clock\n\n\
            ENVIRONMENT:\n    \
            SCOPEGC_LOG_LEVEL, SCOPEGC_LOG_FILE, SCOPEGC_LOG_JSON, SCOPEGC_LOG_SPANS,\n    \
            SCOPEGC_BLOCK_BYTES, SCOPEGC_THRESHOLD, SCOPEGC_AUTO_COLLECT",
            prog
        )
    }
}

/// xorshift64*, enough for jittering particles
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in [lo, hi)
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }
}

#[derive(Debug)]
struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    life: u32,
}

impl Particle {
    /// Advance one frame; false once the particle has expired
    fn step(&mut self) -> bool {
        self.vy += 0.5;
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 || self.x > WIDTH {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, WIDTH);
        }
        if self.y > HEIGHT {
            self.vy *= -0.85;
            self.y = HEIGHT;
        }

        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

struct Simulation {
    heap: Heap,
    global: ObjRef,
    particles: ObjRef,
    rng: Rng,
    spawned: usize,
}

impl Simulation {
    fn new(config: &Config, freed: &Rc<Cell<usize>>) -> Self {
        let mut heap = Heap::with_config(HeapConfig::from_env());

        let freed = Rc::clone(freed);
        heap.set_finalizer(Some(Box::new(move |pointer: &mut ForeignPointer| {
            if pointer.tag() != PARTICLE_TAG {
                return;
            }
            // Every particle pointer is created by `spawn` with a boxed Particle
            if unsafe { pointer.take_boxed::<Particle>() }.is_some() {
                freed.set(freed.get() + 1);
            }
        })));

        let global = heap.new_scope(None);
        heap.add_root(global);
        let particles = heap.new_list();
        heap.add_root(particles);

        let seed = if config.seedless {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(FIXED_SEED)
        } else {
            FIXED_SEED
        };
        debug!(seed, "Simulation initialized");

        Self {
            heap,
            global,
            particles,
            rng: Rng::new(seed),
            spawned: 0,
        }
    }

    fn frame(&mut self, frame: u32, config: &Config) -> HeapResult<()> {
        // Input state: bindings are replaced every frame, leaving garbage behind
        let mouse_x = self.rng.range(0.0, WIDTH);
        let mouse_y = self.rng.range(0.0, HEIGHT);
        let spawning = frame % 4 == 0;

        self.heap.define_int(self.global, "frame", i64::from(frame))?;
        self.heap.define_real(self.global, "mouse_x", mouse_x)?;
        self.heap.define_real(self.global, "mouse_y", mouse_y)?;
        self.heap.define_int(self.global, "spawning", i64::from(spawning))?;

        if self.heap.get_int(self.global, "spawning") != 0 {
            let x = self.heap.get_real(self.global, "mouse_x");
            let y = self.heap.get_real(self.global, "mouse_y");
            for _ in 0..config.spawn {
                self.spawn(x, y, config.life)?;
            }
        }

        self.advance()
    }

    fn spawn(&mut self, x: f64, y: f64, life: u32) -> HeapResult<()> {
        let particle = Particle {
            x,
            y,
            vx: self.rng.range(-4.0, 4.0),
            vy: self.rng.range(-8.0, 0.0),
            life,
        };

        let pointer = self.heap.new_pointer(PARTICLE_TAG);
        self.heap.pointer_mut(pointer)?.attach_boxed(Box::new(particle));
        self.heap.list_push(self.particles, pointer)?;
        self.spawned += 1;
        Ok(())
    }

    /// Step every particle and erase the expired ones from the live list
    fn advance(&mut self) -> HeapResult<()> {
        let handles = self.heap.list(self.particles)?.as_slice().to_vec();
        let mut expired = Vec::new();

        for (index, handle) in handles.into_iter().enumerate() {
            let pointer = self.heap.pointer_mut(handle)?;
            // Only `spawn` attaches state to particle pointers
            let alive = match unsafe { pointer.value_as_mut::<Particle>() } {
                Some(particle) => particle.step(),
                None => false,
            };
            if !alive {
                expired.push(index);
            }
        }

        let list = self.heap.list_mut(self.particles)?;
        for index in expired.into_iter().rev() {
            list.erase(index);
        }
        Ok(())
    }

    fn report(&self, frame: u32) {
        let stats = self.heap.stats();
        info!(
            frame,
            live_objects = stats.live_objects,
            arena_bytes = stats.allocator.bytes_in_use,
            particles = self.heap.list_len(self.particles).unwrap_or(0),
            collections = stats.gc.collections_run,
            threshold = stats.gc.threshold,
            "Frame stats"
        );
    }
}

fn main() {
    logging::init();

    let config = match Config::from_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    debug!(?config, "Configuration loaded");

    let freed = Rc::new(Cell::new(0));
    let mut sim = Simulation::new(&config, &freed);

    for frame in 0..config.frames {
        if let Err(e) = sim.frame(frame, &config) {
            error!(frame, error = %e, "Frame failed");
            eprintln!("Error in frame {}: {}", frame, e);
            std::process::exit(1);
        }
        if frame % 60 == 0 {
            sim.report(frame);
        }
    }

    let spawned = sim.spawned;
    let stats = sim.heap.stats();
    drop(sim);

    info!(
        frames = config.frames,
        spawned,
        freed = freed.get(),
        collections = stats.gc.collections_run,
        reclaimed = stats.gc.objects_reclaimed,
        "Simulation finished"
    );

    if freed.get() != spawned {
        warn!(spawned, freed = freed.get(), "Finalizer count mismatch");
        eprintln!("Leaked {} particles", spawned.saturating_sub(freed.get()));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_lists_environment_variables() {
        let usage = Config::usage("scopegc-sim");
        for var in [
            "SCOPEGC_LOG_LEVEL",
            "SCOPEGC_LOG_FILE",
            "SCOPEGC_LOG_JSON",
            "SCOPEGC_LOG_SPANS",
            "SCOPEGC_BLOCK_BYTES",
            "SCOPEGC_THRESHOLD",
            "SCOPEGC_AUTO_COLLECT",
        ] {
            assert!(usage.contains(var), "usage is missing {}", var);
        }
        assert!(!usage.contains("SCOPEGC_LOG_FORMAT"));
    }

    #[test]
    fn test_particle_expires_after_life() {
        let mut particle = Particle { x: 10.0, y: 10.0, vx: 1.0, vy: 0.0, life: 3 };
        assert!(particle.step());
        assert!(particle.step());
        assert!(!particle.step());
    }
}
