use minesweeper_core::{GameConfig, Level, Preferences, SCALES};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct MenuProps {
    #[prop_or_default]
    pub open: bool,
    pub prefs: Preferences,
    /// Level to switch to, with the typed-in field for [`Level::Custom`].
    pub on_select: Callback<(Level, Option<GameConfig>)>,
    pub on_toggle_marks: Callback<()>,
    pub on_toggle_status_bar: Callback<()>,
    pub on_scale: Callback<u16>,
}

#[function_component]
pub(crate) fn MenuView(props: &MenuProps) -> Html {
    let MenuProps {
        open,
        prefs,
        on_select,
        on_toggle_marks,
        on_toggle_status_bar,
        on_scale,
    } = props;

    let height = use_state(|| prefs.config.rows.to_string());
    let width = use_state(|| prefs.config.columns.to_string());
    let mines = use_state(|| prefs.config.mines.to_string());

    let field = |state: &UseStateHandle<String>| {
        let state = state.clone();
        Callback::from(move |e: InputEvent| {
            state.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let levels = Level::ALL
        .into_iter()
        .filter(|level| level.config().is_some())
        .map(|level| {
            let onclick = on_select.reform(move |_: MouseEvent| (level, None));
            let checked = prefs.level == level;
            html! {
                <li>
                    <label>
                        <input type="radio" name="level" {checked} {onclick}/>
                        {level.name()}
                    </label>
                </li>
            }
        });

    let on_custom = {
        let (height, width, mines) = (height.clone(), width.clone(), mines.clone());
        on_select.reform(move |_: MouseEvent| {
            let config = GameConfig::parse(&height, &width, &mines);
            log::debug!("custom field: {:?}", config);
            (Level::Custom, Some(config))
        })
    };

    let on_scale_change = on_scale.reform(|e: Event| {
        let value = e.target_unchecked_into::<HtmlSelectElement>().value();
        value.parse().unwrap_or(minesweeper_core::DEFAULT_SCALE)
    });

    html! {
        <dialog id="menu" open={*open}>
            <article>
                <h2>{"Game"}</h2>
                <ul>{ for levels }</ul>
                <fieldset class={(prefs.level == Level::Custom).then_some("selected")}>
                    <legend>{Level::Custom.name()}</legend>
                    <label>{"Height"}<input type="number" value={(*height).clone()} oninput={field(&height)}/></label>
                    <label>{"Width"}<input type="number" value={(*width).clone()} oninput={field(&width)}/></label>
                    <label>{"Mines"}<input type="number" value={(*mines).clone()} oninput={field(&mines)}/></label>
                    <button onclick={on_custom}>{"OK"}</button>
                </fieldset>
                <label>
                    <input type="checkbox" checked={prefs.marks} onclick={on_toggle_marks.reform(|_: MouseEvent| ())}/>
                    {"Marks (?)"}
                </label>
                <label>
                    <input type="checkbox" checked={prefs.status_bar} onclick={on_toggle_status_bar.reform(|_: MouseEvent| ())}/>
                    {"Status bar"}
                </label>
                <label>
                    {"Scale"}
                    <select onchange={on_scale_change}>
                        {
                            for SCALES.iter().map(|&scale| html! {
                                <option value={scale.to_string()} selected={scale == prefs.scale}>
                                    {format!("{}%", scale)}
                                </option>
                            })
                        }
                    </select>
                </label>
            </article>
        </dialog>
    }
}
