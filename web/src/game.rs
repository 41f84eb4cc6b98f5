use crate::menu::MenuView;
use crate::utils::*;
use gloo::timers::callback::Interval;
use minesweeper_core as game;
use game::{
    Action, CellCount, CellIndex, Face, GameConfig, Level, Phase, PointerEvent, PointerKind,
    PointerTracker, Preferences, Session, SessionObserver, Target, Tile,
};
use serde::{Deserialize, Serialize};
use yew::prelude::*;

/// What the session reported while handling one message.
#[derive(Debug, Default)]
struct Changes {
    redraw: bool,
    /// Latest ticker request, if any.
    timer: Option<bool>,
}

impl SessionObserver for Changes {
    fn on_flags_change(&mut self, flags: CellCount) {
        log::trace!("flags: {}", flags);
        self.redraw = true;
    }

    fn on_time_change(&mut self, seconds: u32) {
        log::trace!("time: {}", seconds);
        self.redraw = true;
    }

    fn on_status_change(&mut self, phase: Phase) {
        log::debug!("status: {:?}", phase);
        self.redraw = true;
    }

    fn on_timer_change(&mut self, running: bool) {
        self.timer = Some(running);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum Msg {
    Pointer(PointerEvent),
    Tick,
    Select(Level, Option<GameConfig>),
    ToggleMarks,
    ToggleStatusBar,
    SetScale(u16),
    ToggleMenu,
}

/// Forwards a DOM mouse event as a [`PointerEvent`] on `target`.
fn pointer_callback(
    callback: &Callback<PointerEvent>,
    kind: PointerKind,
    target: Option<Target>,
) -> Callback<MouseEvent> {
    let callback = callback.clone();
    Callback::from(move |e: MouseEvent| {
        // the board container only sees releases that missed every cell
        e.stop_propagation();
        callback.emit(PointerEvent::from_raw(kind, target, e.buttons()));
    })
}

fn tile_classes(tile: Tile) -> Classes {
    use Tile::*;
    match tile {
        Closed => classes!(),
        Open(count) => classes!("open", format!("num-{}", count)),
        Flag => classes!("flag"),
        Question => classes!("question"),
        Exploded => classes!("open", "mine", "oops"),
        Mine => classes!("open", "mine"),
        IncorrectFlag => classes!("flag", "wrong"),
    }
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    index: CellIndex,
    tile: Tile,
    #[prop_or_default]
    pressed: bool,
    callback: Callback<PointerEvent>,
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    use PointerKind::*;

    let CellProps {
        index,
        tile,
        pressed,
        callback,
    } = props.clone();

    let mut class = classes!("cell", tile_classes(tile));
    if pressed {
        class.push("open");
    }

    let target = Some(Target::Cell(index));
    let onmousedown = pointer_callback(&callback, Down, target);
    let onmouseup = pointer_callback(&callback, Up, target);
    let onmouseenter = pointer_callback(&callback, Enter, target);
    let onmouseleave = pointer_callback(&callback, Leave, target);

    html! {
        <td {class} {onmousedown} {onmouseup} {onmouseenter} {onmouseleave}/>
    }
}

#[derive(Properties, Clone, PartialEq)]
struct FaceProps {
    face: Face,
    callback: Callback<PointerEvent>,
}

#[function_component(FaceView)]
fn face_component(props: &FaceProps) -> Html {
    use PointerKind::*;

    let FaceProps { face, callback } = props.clone();
    let class = classes!(match face {
        Face::Smile => "smile",
        Face::Surprised => "surprised",
        Face::Sunken => "sunken",
        Face::Dead => "dead",
        Face::Win => "win",
    });

    let target = Some(Target::Face);
    let onmousedown = pointer_callback(&callback, Down, target);
    let onmouseup = pointer_callback(&callback, Up, target);
    let onmouseenter = pointer_callback(&callback, Enter, target);
    let onmouseleave = pointer_callback(&callback, Leave, target);

    html! {
        <button {class} {onmousedown} {onmouseup} {onmouseenter} {onmouseleave}/>
    }
}

#[derive(Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[prop_or_default]
    pub seed: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct GameView {
    prefs: Preferences,
    session: Session,
    tracker: PointerTracker,
    menu_open: bool,
    timer: Option<Interval>,
}

impl GameView {
    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(1000, move || link.send_message(Msg::Tick))
    }

    /// Keeps at most one ticker alive, following the session's requests.
    fn apply_timer(&mut self, ctx: &Context<Self>, running: Option<bool>) {
        match running {
            Some(true) => self.timer = Some(Self::create_timer(ctx)),
            // dropping the interval cancels it
            Some(false) => self.timer = None,
            None => {}
        }
    }

    fn dispatch(&mut self, action: Action, changes: &mut Changes) -> bool {
        log::debug!("action: {:?}", action);
        self.session
            .dispatch(action, changes)
            .unwrap_or_else(|err| {
                log::error!("{:?} failed: {}", action, err);
                false
            })
    }

    fn status_text(&self) -> String {
        let status = match self.session.phase() {
            Phase::New => "Ready",
            Phase::Playing => "Playing",
            Phase::Exploded => "Game over",
            Phase::Won => "Cleared",
        };
        let config = self.session.config();
        format!(
            "{} {}x{}, {} mines: {}",
            self.prefs.level.name(),
            config.rows,
            config.columns,
            config.mines,
            status
        )
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let prefs = load_preferences();
        apply_scale(prefs.scale);

        let seed = ctx.props().seed.unwrap_or_else(js_random_seed);
        let mut session = Session::new(prefs.config, seed)
            .or_else(|err| {
                log::error!("could not start {:?}: {}", prefs.config, err);
                Session::new(GameConfig::default(), seed)
            })
            .expect("the beginner field is always valid");
        session.set_marks_enabled(prefs.marks);

        Self {
            prefs,
            session,
            tracker: PointerTracker::default(),
            menu_open: false,
            timer: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let mut changes = Changes::default();
        let updated = match msg {
            Pointer(event) => {
                let before = self.tracker.clone();
                let action = self.tracker.handle(event);
                let moved = self.tracker != before;
                match action {
                    Some(action) => self.dispatch(action, &mut changes) || moved,
                    None => moved,
                }
            }
            Tick => self.session.tick(&mut changes),
            Select(level, custom) => {
                let config = self.prefs.select(level, custom);
                save_preferences(&self.prefs);
                if let Err(err) = self.session.reconfigure(config, &mut changes) {
                    log::error!("could not switch to {:?}: {}", config, err);
                }
                self.menu_open = false;
                true
            }
            ToggleMarks => {
                self.prefs.marks = !self.prefs.marks;
                self.session.set_marks_enabled(self.prefs.marks);
                save_preferences(&self.prefs);
                true
            }
            ToggleStatusBar => {
                self.prefs.status_bar = !self.prefs.status_bar;
                save_preferences(&self.prefs);
                true
            }
            SetScale(scale) if scale != self.prefs.scale => {
                self.prefs.scale = scale;
                apply_scale(scale);
                save_preferences(&self.prefs);
                true
            }
            SetScale(_) => false,
            ToggleMenu => {
                self.menu_open = !self.menu_open;
                true
            }
        };

        self.apply_timer(ctx, changes.timer);
        updated || changes.redraw
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let snapshot = self.session.snapshot();
        let phase = snapshot.phase;
        let columns = snapshot.columns();
        let pressed = self.tracker.pressed_cells(self.session.board(), phase);
        let face = self.tracker.face(phase);
        let mines_left = format_for_counter(self.session.mines_left());
        let elapsed_time =
            format_for_counter(i32::try_from(self.session.elapsed_secs()).unwrap_or(i32::MAX));

        let on_pointer = ctx.link().callback(Pointer);
        let on_release_outside = {
            let on_pointer = on_pointer.clone();
            Callback::from(move |e: MouseEvent| {
                on_pointer.emit(PointerEvent::from_raw(PointerKind::Up, None, e.buttons()))
            })
        };
        let cb_show_menu = ctx.link().callback(|_: MouseEvent| ToggleMenu);
        let on_select = ctx
            .link()
            .callback(|(level, custom): (Level, Option<GameConfig>)| Select(level, custom));
        let on_toggle_marks = ctx.link().callback(|()| ToggleMarks);
        let on_toggle_status_bar = ctx.link().callback(|()| ToggleStatusBar);
        let on_scale = ctx.link().callback(SetScale);

        html! {
            <div class="minesweeper"
                oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}
                onmouseup={on_release_outside}>
                <small onclick={cb_show_menu}>{"···"}</small>
                <nav>
                    <aside>{mines_left}</aside>
                    <span><FaceView {face} callback={on_pointer.clone()}/></span>
                    <aside>{elapsed_time}</aside>
                </nav>
                <table class={(!phase.is_final()).then_some("playable")}>
                    {
                        for (0..snapshot.rows()).map(|row| html! {
                            <tr>
                                {
                                    for (0..columns).map(|column| {
                                        let index = row * columns + column;
                                        let tile = snapshot.tile(index).unwrap_or_default();
                                        let pressed = pressed.contains(&index);
                                        let callback = on_pointer.clone();
                                        html! {
                                            <CellView {index} {tile} {pressed} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                if self.prefs.status_bar {
                    <footer>{self.status_text()}</footer>
                }
                <MenuView
                    open={self.menu_open}
                    prefs={self.prefs}
                    {on_select}
                    {on_toggle_marks}
                    {on_toggle_status_bar}
                    {on_scale}/>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_keep_latest_timer_request() {
        // a single cascade that wins the round starts and stops the ticker at once
        let board = game::Board::from_mines(3, 3, &[8]).unwrap();
        let mut session = Session::with_board(board, 0);
        let mut changes = Changes::default();

        assert!(session.dispatch(Action::Reveal(0), &mut changes).unwrap());

        assert_eq!(changes.timer, Some(false));
        assert!(changes.redraw);
    }

    #[test]
    fn unchanged_session_requests_no_redraw() {
        let board = game::Board::from_mines(3, 3, &[8]).unwrap();
        let mut session = Session::with_board(board, 0);
        let mut changes = Changes::default();

        assert!(!session.tick(&mut changes));
        assert!(!changes.redraw);
        assert_eq!(changes.timer, None);
    }

    #[test]
    fn tile_classes_mark_endgame_tiles() {
        assert!(tile_classes(Tile::Exploded).contains("oops"));
        assert!(tile_classes(Tile::IncorrectFlag).contains("wrong"));
        assert!(tile_classes(Tile::Open(3)).contains("num-3"));
        assert!(tile_classes(Tile::Closed).is_empty());
    }
}
