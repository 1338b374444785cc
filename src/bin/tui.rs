use clap::Parser;
use cursive::view::Margins;
use cursive::views::{Button, Dialog, DummyView, LinearLayout, TextView};
use cursive::{Cursive, CursiveExt};
use minegrid::{Config, Game, Visibility};

#[derive(Debug, Parser)]
#[command(name = "minegrid-tui", about = "Grid-reveal mine puzzle, terminal edition")]
struct Args {
    /// Board side length
    #[arg(long, default_value_t = 8)]
    size: usize,

    /// Number of mines (clamped to the board area)
    #[arg(long, default_value_t = 10)]
    mines: usize,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

/// Front-end state carried in cursive's user data.
struct App {
    config: Config,
    game: Game,
    flagging: bool,
    in_game: bool,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();

    let config = Config::new(args.size, args.mines);
    let mut siv = Cursive::new();
    siv.set_user_data(App {
        config,
        game: Game::new(config),
        flagging: false,
        in_game: false,
    });

    // Add global callbacks
    siv.add_global_callback('q', |s| s.quit());
    siv.add_global_callback('f', toggle_mode);
    // Create the main menu dialog
    menu(&mut siv);

    // Start the event loop
    siv.run();
}

fn menu(siv: &mut Cursive) {
    siv.add_layer(
        Dialog::new()
            .title("Minegrid")
            .padding(Margins::lrtb(2, 2, 1, 1))
            .content(
                LinearLayout::vertical()
                    .child(Button::new("Start", start))
                    .child(Button::new("Quit", Cursive::quit)),
            ),
    );
}

fn start(siv: &mut Cursive) {
    siv.pop_layer();

    let Some(app) = siv.user_data::<App>() else {
        return;
    };
    app.game = Game::new(app.config);
    app.flagging = false;
    app.in_game = true;
    let board = board_dialog(app);
    siv.add_layer(board);
}

/// Rebuild the board layer from the current game state.
fn refresh(siv: &mut Cursive) {
    let Some(app) = siv.user_data::<App>() else {
        return;
    };
    if !app.in_game {
        return;
    }
    let board = board_dialog(app);
    siv.pop_layer();
    siv.add_layer(board);
}

fn board_dialog(app: &App) -> Dialog {
    let size = app.game.size();
    let mut rows = LinearLayout::vertical();
    for y in 0..size {
        let mut row = LinearLayout::horizontal();
        for x in 0..size {
            let label = cell_label(&app.game, x, y);
            row.add_child(Button::new_raw(label, move |s| on_cell(s, x, y)));
        }
        rows.add_child(row);
    }

    let remaining = app.game.mines() as isize - app.game.flagged() as isize;
    let mode = if app.flagging { "flag" } else { "open" };
    let status = format!("mines left: {remaining}   mode: {mode} (f toggles, q quits)");

    Dialog::new().title("Minegrid").content(
        LinearLayout::vertical()
            .child(rows)
            .child(DummyView)
            .child(TextView::new(status)),
    )
}

fn cell_label(game: &Game, x: usize, y: usize) -> String {
    match game.visibility(x, y) {
        Some(Visibility::Closed) | None => " ◻ ".to_string(),
        Some(Visibility::Flagged) => " ⚑ ".to_string(),
        Some(Visibility::Open) => match game.neighbor_mines(x, y) {
            Some(0) | None => "   ".to_string(),
            Some(n) => format!(" {n} "),
        },
    }
}

/// Handle an activated cell button: flag in flag mode, open otherwise.
fn on_cell(siv: &mut Cursive, x: usize, y: usize) {
    let (hit, finished) = {
        let Some(app) = siv.user_data::<App>() else {
            return;
        };
        if app.flagging {
            app.game.toggle_flag(x, y);
            (false, app.game.is_finished())
        } else {
            (app.game.open(x, y).is_mine_hit(), app.game.is_finished())
        }
    };

    refresh(siv);
    if hit {
        game_over(siv, false);
    } else if finished {
        game_over(siv, true);
    }
}

fn toggle_mode(siv: &mut Cursive) {
    let Some(app) = siv.user_data::<App>() else {
        return;
    };
    if !app.in_game {
        return;
    }
    app.flagging = !app.flagging;
    refresh(siv);
}

/// Show the end-of-game dialog with every mine uncovered.
fn game_over(siv: &mut Cursive, won: bool) {
    let reveal = {
        let Some(app) = siv.user_data::<App>() else {
            return;
        };
        app.in_game = false;
        app.game.reveal().to_string()
    };

    let title = if won { "Game clear!" } else { "Game over!" };
    siv.add_layer(
        Dialog::text(reveal)
            .title(title)
            .button("Menu", |s| {
                // Drop this dialog and the board underneath it.
                s.pop_layer();
                s.pop_layer();
                menu(s);
            })
            .button("Quit", Cursive::quit),
    );
}
