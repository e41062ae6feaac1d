use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail};

use prompt_refiner::bridge::{DetachedPage, PageBridge};
use prompt_refiner::session::{Feedback, Flow, Intent, Orchestrator, PromptSlot, SessionState};
use prompt_refiner::store::{HandoffSlot, MemoryHandoffSlot};

use super::render;
use super::AppContext;
use crate::args::{AgenticArgs, Command, PageArgs, RefineArgs};
use crate::page_file::PageFile;

pub async fn handle_command(command: Command, ctx: &AppContext) -> anyhow::Result<()> {
    match command {
        Command::Status => status(ctx).await,
        Command::Mode { id } => update(ctx, Intent::SelectMode(id)).await,
        Command::Persona { id } => update(ctx, Intent::SelectPersona(id)).await,
        Command::Toggle { id } => update(ctx, Intent::Toggle(id)).await,
        Command::Preset { id } => update(ctx, Intent::ApplyPreset(id)).await,
        Command::Model { id } => update(ctx, Intent::SelectModel(id)).await,
        Command::Temperature { value } => update(ctx, Intent::SetTemperature(value)).await,
        Command::Instructions { text } => {
            update(ctx, Intent::SetCustomInstructions(text)).await
        }
        Command::Pipeline { id } => update(ctx, Intent::SelectPipeline(id)).await,
        Command::Refine(args) => refine(ctx, args).await,
        Command::Agentic(args) => agentic(ctx, args).await,
        Command::History { limit, recall } => history(ctx, limit, recall).await,
        Command::Handoff { text } => handoff(ctx, &text),
    }
}

/// Sessions that must not consume queued handoff text start from this.
fn no_handoff() -> MemoryHandoffSlot {
    MemoryHandoffSlot::default()
}

async fn status(ctx: &AppContext) -> anyhow::Result<()> {
    let orchestrator = ctx.orchestrator(Arc::new(DetachedPage));
    let state = orchestrator.start(&no_handoff()).await;
    print!("{}", render::status(&state));
    Ok(())
}

async fn update(ctx: &AppContext, intent: Intent) -> anyhow::Result<()> {
    let orchestrator = ctx
        .orchestrator(Arc::new(DetachedPage))
        .with_startup_history(false);
    let mut state = orchestrator.start(&no_handoff()).await;
    orchestrator.dispatch(&mut state, intent).await;
    ensure_no_notice(&state, PromptSlot::Refine)?;
    ensure_no_notice(&state, PromptSlot::Agentic)?;
    print!("{}", render::selection(&state));
    Ok(())
}

async fn refine(ctx: &AppContext, args: RefineArgs) -> anyhow::Result<()> {
    let flow = if args.chain { Flow::Chain } else { Flow::Single };
    let (page, page_file) = attach_page(args.page.page.as_deref())?;
    let result = {
        let orchestrator = ctx.orchestrator(page).with_startup_history(false);
        run_refine(&orchestrator, &ctx.handoff, flow, &args).await
    };
    close_page(page_file).await?;
    result
}

async fn run_refine(
    orchestrator: &Orchestrator,
    handoff: &dyn HandoffSlot,
    flow: Flow,
    args: &RefineArgs,
) -> anyhow::Result<()> {
    let slot = PromptSlot::Refine;
    let mut state = orchestrator.start(handoff).await;
    prepare_prompt(orchestrator, &mut state, slot, args.prompt.clone(), &args.page).await?;
    run_flow(orchestrator, &mut state, flow).await?;

    let display = state
        .last_result
        .as_ref()
        .ok_or_else(|| anyhow!("service returned no result"))?;
    print!("{}", render::refine_result(display));

    if let Some(tab) = args.copy {
        orchestrator
            .dispatch(&mut state, Intent::SelectOutputTab(tab.into()))
            .await;
        orchestrator
            .dispatch(&mut state, Intent::CopyOutput(slot))
            .await;
        ensure_no_notice(&state, slot)?;
        eprintln!("Copied {tab:?} to the clipboard.");
    }
    if args.page.replace {
        replace(orchestrator, &mut state, slot).await?;
    }
    Ok(())
}

async fn agentic(ctx: &AppContext, args: AgenticArgs) -> anyhow::Result<()> {
    let (page, page_file) = attach_page(args.page.page.as_deref())?;
    let result = {
        let orchestrator = ctx.orchestrator(page).with_startup_history(false);
        run_agentic(&orchestrator, &args).await
    };
    close_page(page_file).await?;
    result
}

async fn run_agentic(orchestrator: &Orchestrator, args: &AgenticArgs) -> anyhow::Result<()> {
    let slot = PromptSlot::Agentic;
    let mut state = orchestrator.start(&no_handoff()).await;
    prepare_prompt(orchestrator, &mut state, slot, args.prompt.clone(), &args.page).await?;
    run_flow(orchestrator, &mut state, Flow::Agentic).await?;

    if args.full {
        let steps = state.last_agentic.as_ref().map_or(0, |v| v.steps.len());
        for index in 0..steps {
            orchestrator
                .dispatch(&mut state, Intent::ToggleStep(index))
                .await;
        }
    }
    let view = state
        .last_agentic
        .as_ref()
        .ok_or_else(|| anyhow!("service returned no result"))?;
    print!("{}", render::agentic_result(view));

    if args.copy {
        orchestrator
            .dispatch(&mut state, Intent::CopyOutput(slot))
            .await;
        ensure_no_notice(&state, slot)?;
        eprintln!("Copied the final prompt to the clipboard.");
    }
    if args.page.replace {
        replace(orchestrator, &mut state, slot).await?;
    }
    Ok(())
}

async fn history(
    ctx: &AppContext,
    limit: Option<usize>,
    recall: Option<usize>,
) -> anyhow::Result<()> {
    let mut orchestrator = ctx.orchestrator(Arc::new(DetachedPage));
    if let Some(limit) = limit {
        orchestrator = orchestrator.with_history_limit(limit);
    }
    // Session start fetches history; no second fetch is needed here.
    let mut state = orchestrator.start(&no_handoff()).await;

    let Some(index) = recall else {
        print!("{}", render::history(&state.history));
        return Ok(());
    };
    if index >= state.history.rows().len() {
        bail!("No history entry at index {index}.");
    }
    orchestrator
        .dispatch(&mut state, Intent::RecallHistory(index))
        .await;
    ctx.handoff.offer(&state.refine_prompt)?;
    println!("{}", state.refine_prompt);
    eprintln!("Queued for the next refine.");
    Ok(())
}

fn handoff(ctx: &AppContext, text: &str) -> anyhow::Result<()> {
    ctx.handoff.offer(text)?;
    eprintln!("Queued {} characters for the next refine.", text.trim().chars().count());
    Ok(())
}

/// Applies the prompt argument, then an optional capture that overrides it.
async fn prepare_prompt(
    orchestrator: &Orchestrator,
    state: &mut SessionState,
    slot: PromptSlot,
    prompt: Option<String>,
    page: &PageArgs,
) -> anyhow::Result<()> {
    if let Some(text) = prompt {
        orchestrator
            .dispatch(state, Intent::EditPrompt { slot, text })
            .await;
    }
    if let Some(source) = page.from {
        orchestrator
            .dispatch(
                state,
                Intent::CaptureInto {
                    kind: source.into(),
                    slot,
                },
            )
            .await;
        ensure_no_notice(state, slot)?;
        log::debug!("captured {} characters", state.prompt(slot).len());
    }
    Ok(())
}

async fn run_flow(
    orchestrator: &Orchestrator,
    state: &mut SessionState,
    flow: Flow,
) -> anyhow::Result<()> {
    orchestrator.dispatch(state, Intent::RunFlow(flow)).await;
    match &state.status(flow).error {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

async fn replace(
    orchestrator: &Orchestrator,
    state: &mut SessionState,
    slot: PromptSlot,
) -> anyhow::Result<()> {
    orchestrator.dispatch(state, Intent::InjectFrom(slot)).await;
    ensure_no_notice(state, slot)?;
    if state.feedback != Some(Feedback::Replaced(slot)) {
        bail!("Nothing to replace: the result is empty.");
    }
    eprintln!("Replaced the page's active field.");
    Ok(())
}

fn ensure_no_notice(state: &SessionState, slot: PromptSlot) -> anyhow::Result<()> {
    match state.notice(slot) {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

fn attach_page(path: Option<&Path>) -> anyhow::Result<(Arc<dyn PageBridge>, Option<PageFile>)> {
    match path {
        Some(path) => {
            let (file, bridge) = PageFile::open(path)?;
            Ok((Arc::new(bridge), Some(file)))
        }
        None => Ok((Arc::new(DetachedPage), None)),
    }
}

/// Must run after the orchestrator holding the bridge is dropped.
async fn close_page(page_file: Option<PageFile>) -> anyhow::Result<()> {
    if let Some(file) = page_file {
        if file.close().await? {
            eprintln!("Saved the page snapshot.");
        }
    }
    Ok(())
}
