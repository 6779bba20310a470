use fade_lib::cli::{
    ResolvedCommand, parse_args, resolve_command, run_create_deb, run_edit, run_init,
};
use fade_lib::error::FadeError;
use fade_lib::payload::ExternalEditor;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), FadeError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    match command {
        ResolvedCommand::Init(params) => run_init(params)?,
        ResolvedCommand::Edit(params) => {
            run_edit(params, &ExternalEditor::from_env())?;
        }
        ResolvedCommand::CreateDeb(params) => run_create_deb(params).await?,
    }

    Ok(())
}
