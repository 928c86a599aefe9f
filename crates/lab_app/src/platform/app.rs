use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use lab_core::{update, AppState, Msg};
use lab_engine::{result_queue, JobDispatcher, ProcessInvoker, ResultQueue};
use lab_logging::{lab_info, lab_warn};

use super::console::{parse_command, render, ConsoleCommand, HELP};
use super::effects::{notify, EffectRunner};
use super::{LabConfig, LOG_FILENAME};

pub fn run_app() -> anyhow::Result<()> {
    let (config, warning) = LabConfig::load();
    lab_logging::initialize(config.log_destination, Path::new(LOG_FILENAME));
    lab_info!("Starting eTOXlab");
    config.report(warning.as_deref());
    if let Some(warning) = &warning {
        notify(&format!("{warning}; using defaults"));
    }

    let work_dir = std::env::current_dir().context("cannot determine working directory")?;
    let (sender, queue) = result_queue();
    let dispatcher = JobDispatcher::new(
        config.engine_config(work_dir),
        Arc::new(ProcessInvoker),
        sender,
    );
    let runner = EffectRunner::new(dispatcher, config.viewer.clone());

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("cannot start console input thread")?;

    let mut app = ConsoleApp {
        state: AppState::new(),
        runner,
        queue,
    };
    println!("{HELP}");
    let initial = app.runner.load_models(true);
    app.dispatch(initial);
    app.render_if_dirty();

    let interval = Duration::from_millis(config.poll_interval_ms.max(10));
    let mut input_open = true;
    loop {
        thread::sleep(interval);

        while input_open {
            match line_rx.try_recv() {
                Ok(line) => {
                    if !app.handle_line(&line) {
                        lab_info!("Console closed by user");
                        return Ok(());
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => input_open = false,
            }
        }

        app.poll();

        if !input_open && app.state.view().jobs.is_empty() {
            lab_info!("Input closed and no jobs running, exiting");
            return Ok(());
        }
    }
}

struct ConsoleApp {
    state: AppState,
    runner: EffectRunner,
    queue: ResultQueue,
}

impl ConsoleApp {
    /// One poll tick: every queued worker message is applied in arrival order.
    fn poll(&mut self) {
        for message in self.queue.drain() {
            self.dispatch(Msg::Queue(message));
        }
        self.dispatch(Msg::Tick);
        self.render_if_dirty();
    }

    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match parse_command(line, self.state.selection()) {
            Ok(ConsoleCommand::Dispatch(msg)) => self.dispatch(msg),
            Ok(ConsoleCommand::Refresh) => {
                let msg = self.runner.load_models(false);
                self.dispatch(msg);
            }
            Ok(ConsoleCommand::Help) => println!("{HELP}"),
            Ok(ConsoleCommand::Quit) => return false,
            Ok(ConsoleCommand::Empty) => {}
            Err(reason) => {
                lab_warn!("Rejected console input {:?}: {}", line, reason);
                notify(&reason);
            }
        }
        self.render_if_dirty();
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        let mut pending = VecDeque::from([msg]);
        while let Some(msg) = pending.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            pending.extend(self.runner.run(effects));
        }
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            print!("{}", render(&self.state.view()));
        }
    }
}
