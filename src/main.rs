#[cfg(not(feature = "export-wav"))]
fn main() {
    eprintln!(
        "The sgu1-render CLI requires the \"export-wav\" feature. Rebuild with `--features export-wav` to enable rendering."
    );
}

#[cfg(feature = "export-wav")]
mod cli {
    use std::env;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use anyhow::{bail, Context};
    use log::{info, warn, LevelFilter};
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    use sgu1::sgu1::pins;
    use sgu1::sgu1::{Register, CHANNEL_COUNT};
    use sgu1::sound_unit::flags::Waveform;
    use sgu1::sound_unit::{FREQ_BASE, NATIVE_RATE};
    use sgu1::streaming::{StreamConfig, BUFFER_BACKOFF_MICROS};
    use sgu1::{write_wav, ExportConfig, SampleStream, Sgu1, Sgu1Config, SoundEngine, SoundUnit};

    /// Frames pushed to the ring per producer batch
    const BATCH_FRAMES: usize = 1024;

    /// A-minor seventh spread over four voices: (Hz, waveform, pan)
    const CHORD: [(f64, Waveform, i8); 4] = [
        (220.00, Waveform::Saw, 0),
        (261.63, Waveform::Pulse, -64),
        (329.63, Waveform::Triangle, 64),
        (392.00, Waveform::Sine, 0),
    ];

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum EngineChoice {
        SoundUnit,
        #[cfg(feature = "softsynth")]
        SoftSynth,
    }

    impl EngineChoice {
        fn from_str(value: &str) -> Option<Self> {
            match value.to_ascii_lowercase().as_str() {
                "soundunit" | "su" => Some(EngineChoice::SoundUnit),
                #[cfg(feature = "softsynth")]
                "softsynth" => Some(EngineChoice::SoftSynth),
                _ => None,
            }
        }
    }

    struct Options {
        output: String,
        seconds: f32,
        engine: EngineChoice,
        config: Sgu1Config,
        verbose: bool,
    }

    fn usage() {
        eprintln!(
            "Usage:\n  sgu1-render [options] <out.wav>\n\nOptions:\n  --seconds <n>        Length to render (default 2)\n  --config <file>      Chip configuration as JSON\n  --tick-hz <hz>       Host tick rate (default 1000000)\n  --sound-hz <hz>      Output sample rate (default 44100)\n  --engine <name>      Synthesis engine: soundunit (default){}\n  -v, --verbose        Debug logging\n  -h, --help           Show this help",
            if cfg!(feature = "softsynth") {
                ", softsynth"
            } else {
                ""
            }
        );
    }

    fn parse_args() -> anyhow::Result<Option<Options>> {
        let mut output = None;
        let mut seconds = 2.0f32;
        let mut engine = EngineChoice::SoundUnit;
        let mut config = Sgu1Config::default();
        let mut verbose = false;

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(None),
                "--verbose" | "-v" => verbose = true,
                "--seconds" => {
                    let value = args.next().context("--seconds requires a value")?;
                    seconds = value.parse().with_context(|| format!("bad length '{value}'"))?;
                }
                "--tick-hz" => {
                    let value = args.next().context("--tick-hz requires a value")?;
                    config.tick_hz = value.parse().with_context(|| format!("bad rate '{value}'"))?;
                }
                "--sound-hz" => {
                    let value = args.next().context("--sound-hz requires a value")?;
                    config.sound_hz =
                        value.parse().with_context(|| format!("bad rate '{value}'"))?;
                }
                "--config" => {
                    let path = args.next().context("--config requires a file")?;
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read config '{path}'"))?;
                    config = Sgu1Config::from_json(&text)?;
                }
                "--engine" => {
                    let value = args.next().context("--engine requires a name")?;
                    engine = EngineChoice::from_str(&value)
                        .with_context(|| format!("unknown engine '{value}'"))?;
                }
                _ if arg.starts_with('-') => bail!("unknown flag: {arg}"),
                _ => output = Some(arg),
            }
        }

        let Some(output) = output else {
            return Ok(None);
        };
        if !(seconds > 0.0) {
            bail!("length must be positive");
        }
        config.validate()?;

        Ok(Some(Options {
            output,
            seconds,
            engine,
            config,
            verbose,
        }))
    }

    /// Frequency register value for a pitch in Hz
    fn freq_register(hz: f64) -> u16 {
        (hz * f64::from(FREQ_BASE) / f64::from(NATIVE_RATE))
            .round()
            .clamp(0.0, f64::from(u16::MAX)) as u16
    }

    /// Program the chord through the pin bus, as a host CPU would
    fn program_chord<E: SoundEngine>(chip: &mut Sgu1<E>) {
        let mut bus = |addr: u8, value: u8| {
            chip.tick(pins::write_request(addr, value));
        };
        for (channel, &(hz, wave, pan)) in CHORD.iter().enumerate().take(CHANNEL_COUNT) {
            let [lo, hi] = freq_register(hz).to_le_bytes();
            bus(pins::CHANNEL_SELECT_ADDR, channel as u8);
            bus(Register::FreqLo.offset(), lo);
            bus(Register::FreqHi.offset(), hi);
            bus(Register::Duty.offset(), 0x60);
            bus(Register::Pan.offset(), pan as u8);
            bus(Register::Flags0.offset(), wave as u8);
            bus(Register::Volume.offset(), 0x50);
        }
    }

    fn render<E: SoundEngine + 'static>(options: &Options) -> anyhow::Result<Vec<[f32; 2]>> {
        let config = options.config;
        let ticks = (f64::from(config.tick_hz) * f64::from(options.seconds)) as u64;
        let stream = SampleStream::new(StreamConfig::stable(config.sound_hz))?;
        let done = Arc::new(AtomicBool::new(false));

        let mut chip: Sgu1<E> = Sgu1::with_backend(config);
        program_chord(&mut chip);

        let producer = {
            let stream = stream.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut batch = Vec::with_capacity(BATCH_FRAMES * 2);
                for _ in 0..ticks {
                    if pins::is_sample_ready(chip.tick(0)) {
                        batch.extend_from_slice(&chip.sample());
                        if batch.len() >= BATCH_FRAMES * 2 {
                            stream.write_blocking(&batch);
                            batch.clear();
                        }
                    }
                }
                stream.write_blocking(&batch);
                done.store(true, Ordering::Release);
            })
        };

        let mut frames = Vec::new();
        let mut scratch = vec![0.0f32; BATCH_FRAMES * 2];
        loop {
            let finished = done.load(Ordering::Acquire);
            let n = stream.read(&mut scratch);
            frames.extend(scratch[..n].chunks_exact(2).map(|s| [s[0], s[1]]));
            if n == 0 {
                if finished {
                    break;
                }
                thread::sleep(Duration::from_micros(BUFFER_BACKOFF_MICROS));
            }
        }

        if producer.join().is_err() {
            bail!("chip thread panicked");
        }
        let stats = stream.stats();
        info!(
            "streamed {} samples, {} overruns",
            stats.samples_written, stats.overrun_count
        );
        Ok(frames)
    }

    pub fn run() -> anyhow::Result<()> {
        let options = match parse_args() {
            Ok(Some(options)) => options,
            Ok(None) => {
                usage();
                return Ok(());
            }
            Err(e) => {
                usage();
                return Err(e);
            }
        };

        TermLogger::init(
            if options.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            ConfigBuilder::default()
                .set_time_level(LevelFilter::Trace)
                .build(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )?;

        info!(
            "rendering {:.1}s at {} Hz tick / {} Hz sound ({:?})",
            options.seconds, options.config.tick_hz, options.config.sound_hz, options.engine
        );
        let start = Instant::now();

        let frames = match options.engine {
            EngineChoice::SoundUnit => render::<SoundUnit>(&options)?,
            #[cfg(feature = "softsynth")]
            EngineChoice::SoftSynth => render::<sgu1::SoftSynth>(&options)?,
        };
        if frames.is_empty() {
            warn!("no samples produced");
        }

        write_wav(
            &options.output,
            &frames,
            options.config.sound_hz,
            ExportConfig::default().fade_out(0.05),
        )?;
        info!("done in {:.2}s", start.elapsed().as_secs_f32());
        Ok(())
    }
}

#[cfg(feature = "export-wav")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
