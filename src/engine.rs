/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::{
    compile_check_program, compile_move_list, compute_move, load_dataset, perft, splitperft,
    stream_moves, train, vm::VmError, CompiledProgram, EngineCommand, EvalTable, Evaluator, Move,
    Position, Program, Score, Search, SearchConfig, SearchResult, TrainingGame, Weights,
};

/// The Tadpole chess engine.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given.
    pos: Position,

    /// Material values and piece-square tables used to evaluate positions.
    ///
    /// Only [`Engine::train`] modifies these.
    weights: Weights,

    /// Configuration for searches started without an explicit depth.
    config: SearchConfig,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            pos: Position::default(),
            weights: Weights::default(),
            config: SearchConfig::default(),
            sender,
            receiver,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// The position the engine is currently working on.
    #[inline(always)]
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// The engine's current evaluation weights.
    #[inline(always)]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Generates a FEN string of the current position.
    #[inline(always)]
    pub fn fen(&self) -> String {
        self.pos.to_fen()
    }

    /// Replaces the current position.
    pub fn load_position(&mut self, pos: Position) {
        debug!(fen = %pos, "loading position");
        self.pos = pos;
    }

    /// Applies `mv` to the current position without checking its legality.
    pub fn apply_move(&mut self, mv: Move) {
        self.pos.make_move(mv);
    }

    /// Picks the move with the best evaluation one ply ahead, if the side to move has any legal moves.
    pub fn compute_move(&self) -> Result<Option<Move>, VmError> {
        compute_move(&self.pos, &self.weights)
    }

    /// Runs a fixed-depth alpha-beta search on the current position.
    ///
    /// A depth of 0 searches nothing: the score is the static evaluation of the position
    /// and the move is the one chosen by [`Engine::compute_move`].
    pub fn search(&self, depth: usize) -> Result<SearchResult, VmError> {
        if depth == 0 {
            return Ok(SearchResult {
                nodes: 1,
                bestmove: self.compute_move()?,
                score: self.evaluate()?,
            });
        }

        let config = SearchConfig { max_depth: depth };
        Search::new(&self.pos, &self.weights, config).start()
    }

    /// Evaluates the current position from White's perspective.
    pub fn evaluate(&self) -> Result<Score, VmError> {
        Evaluator::new(&self.weights).evaluate(&self.pos)
    }

    /// Lists the legal moves of the current position, after passing them through the VM's output channel.
    pub fn legal_moves(&self) -> Result<Vec<Move>, VmError> {
        stream_moves(&crate::legal_moves(&self.pos)?)
    }

    /// Adjusts the evaluation weights from a set of finished games, returning how many games were used.
    pub fn train(&mut self, games: &[TrainingGame]) -> usize {
        train(&mut self.weights, games)
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Engine is no longer receiving commands")
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err}");
            }
        });

        while let Ok(cmd) = self.receiver.recv() {
            match self.execute(cmd) {
                Ok(true) => continue,
                Ok(false) => break,
                // Keep running, even on error
                Err(e) => eprintln!("Error: {e:#}"),
            }
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`], returning `false` if the engine should stop.
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<bool> {
        debug!(?cmd, "executing command");
        match cmd {
            EngineCommand::Best => match self.compute_move()? {
                Some(mv) => println!("bestmove {mv}"),
                None => println!("bestmove (none)"),
            },

            EngineCommand::Disasm { program } => println!("{}", self.compile(program)?),

            EngineCommand::Display => println!("{:?}", self.pos),

            EngineCommand::Eval { pretty } => self.eval(pretty)?,

            EngineCommand::Exit => return Ok(false),

            EngineCommand::Fen => println!("{}", self.fen()),

            EngineCommand::Go { depth } => {
                let res = self.search(depth.unwrap_or(self.config.max_depth))?;
                println!("info nodes {} score {}", res.nodes, res.score);
                match res.bestmove {
                    Some(mv) => println!("bestmove {mv}"),
                    None => println!("bestmove (none)"),
                }
            }

            EngineCommand::MakeMove { mv_string } => {
                let mv = Move::from_uci(&mv_string)?;
                self.apply_move(mv);
            }

            EngineCommand::Moves => {
                let moves = self.legal_moves()?;

                // If there are none, print "(none)"
                let moves_string = if moves.is_empty() {
                    String::from("(none)")
                } else {
                    moves
                        .into_iter()
                        .map(|mv| mv.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("{moves_string}");
            }

            EngineCommand::Perft { depth } => self.print_perft::<false>(depth)?,

            EngineCommand::Position { args } => self.set_position(&args)?,

            EngineCommand::Splitperft { depth } => self.print_perft::<true>(depth)?,

            EngineCommand::Train { path } => {
                let games = read_dataset(&path)?;
                let used = self.train(&games);
                println!("Trained on {used}/{} games", games.len());
            }
        }

        Ok(true)
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) -> Result<()> {
        if pretty {
            print!("{}\n\nScore: ", EvalTable::new(&self.weights, &self.pos));
        }

        println!("{}", self.evaluate()?);
        Ok(())
    }

    /// Set the position to `startpos` or a FEN string, and then apply any moves following `moves` one-by-one.
    fn set_position(&mut self, args: &[String]) -> Result<()> {
        let (setup, moves) = match args.iter().position(|arg| arg == "moves") {
            Some(idx) => (&args[..idx], &args[idx + 1..]),
            None => (args, &args[args.len()..]),
        };

        let mut pos = match setup {
            [] => bail!("Expected \"startpos\" or a FEN string"),
            [startpos] if startpos == "startpos" => Position::default(),
            fen => fen.join(" ").parse()?,
        };

        let moves = moves
            .iter()
            .map(|mv_str| Move::from_uci(mv_str))
            .collect::<Result<Vec<_>>>()?;
        pos.make_moves(moves);

        self.load_position(pos);
        Ok(())
    }

    /// Compiles one of the engine's programs for the current position.
    fn compile(&self, program: CompiledProgram) -> Result<Program, VmError> {
        match program {
            CompiledProgram::Check => compile_check_program(&self.pos, self.pos.side_to_move()),
            CompiledProgram::Eval => Evaluator::new(&self.weights).compile(&self.pos),
            CompiledProgram::Moves => compile_move_list(&crate::legal_moves(&self.pos)?),
        }
    }

    /// Runs a (split)perft on the current position, printing the node count and timing.
    fn print_perft<const SPLIT: bool>(&self, depth: usize) -> Result<()> {
        let now = Instant::now();
        let nodes = if SPLIT {
            splitperft(&self.pos, depth)?
        } else {
            perft(&self.pos, depth)?
        };
        let elapsed = now.elapsed();

        let nps = nodes as f64 / elapsed.as_secs_f64();
        if SPLIT {
            println!();
        }
        println!("{nodes} nodes in {elapsed:.1?} ({nps:.0} nps)");
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens and parses a training dataset.
fn read_dataset(path: &Path) -> Result<Vec<TrainingGame>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let games = load_dataset(BufReader::new(file))?;
    info!(path = %path.display(), games = games.len(), "loaded dataset");
    Ok(games)
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<EngineCommand>() {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameResult, FEN_KIWIPETE};

    fn run(engine: &mut Engine, cmd: &str) -> bool {
        engine.execute(cmd.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_position_command() {
        let mut engine = Engine::new();
        run(&mut engine, "position startpos moves e2e4 e7e5");
        assert_eq!(
            engine.fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );

        run(&mut engine, &format!("position {FEN_KIWIPETE}"));
        assert_eq!(engine.fen(), FEN_KIWIPETE);

        assert!(engine.execute("position moves e2e4".parse().unwrap()).is_err());
        assert_eq!(engine.fen(), FEN_KIWIPETE);
    }

    #[test]
    fn test_exit_stops_engine() {
        let mut engine = Engine::new();
        assert!(run(&mut engine, "fen"));
        assert!(!run(&mut engine, "exit"));
    }

    #[test]
    fn test_make_move_is_unchecked() {
        let mut engine = Engine::new();
        run(&mut engine, "make-move e2e4");
        run(&mut engine, "make-move d2d4");
        assert_eq!(
            engine.fen(),
            "rnbqkbnr/pppppppp/8/8/3PP3/8/PPP2PPP/RNBQKBNR w KQkq d3 0 2"
        );

        // Moving from an empty square changes nothing
        let before = engine.fen();
        run(&mut engine, "make-move e2e4");
        assert_eq!(engine.fen(), before);
    }

    #[test]
    fn test_legal_moves_through_vm() {
        let engine = Engine::new();
        let moves = engine.legal_moves().unwrap();
        assert_eq!(moves.len(), 20);
        assert_eq!(moves[0].to_uci(), "b1c3");
    }

    #[test]
    fn test_train_updates_weights() {
        let mut engine = Engine::new();

        let game = TrainingGame {
            initial: Position::default(),
            moves: vec![Move::from_uci("e2e4").unwrap()],
            result: GameResult::WhiteWin,
        };
        assert_eq!(engine.train(&[game]), 1);
        assert_ne!(engine.weights(), &Weights::default());
    }

    #[test]
    fn test_depth_zero_is_static() {
        let mut engine = Engine::new();
        engine.load_position(FEN_KIWIPETE.parse().unwrap());

        let res = engine.search(0).unwrap();
        assert_eq!(res.nodes, 1);
        assert_eq!(res.score, engine.evaluate().unwrap());
        assert_eq!(res.bestmove, engine.compute_move().unwrap());
    }

    #[test]
    fn test_search_and_compute_move() {
        let mut engine = Engine::new();
        engine.load_position("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1".parse().unwrap());

        let res = engine.search(2).unwrap();
        assert_eq!(res.bestmove, Some(Move::from_uci("a1a8").unwrap()));
        assert!(res.score.is_mate());
        assert!(engine.compute_move().unwrap().is_some());
    }
}
