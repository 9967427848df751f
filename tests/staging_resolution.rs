// tests/staging_resolution.rs

use stageflow::action::{Action, ActionKind, FileRef, Realm};
use stageflow::config::ConfigFile;
use stageflow::errors::ResolutionError;
use stageflow::staging::rules::{self, RuleKey};
use stageflow::staging::{
    BashResolver, ResolveContext, ResolvedUnit, ResolverChain, StageMode, StageResolver,
    StagingDirective,
};
use stageflow::types::BackendKind;

fn file(url: &str) -> FileRef {
    FileRef::parse(url).unwrap()
}

fn commands(units: &[ResolvedUnit]) -> Vec<&str> {
    units.iter().map(|u| u.as_command().unwrap()).collect()
}

#[test]
fn copy_folder_from_shared_strips_prefixes() {
    let ctx = ResolveContext::new().with_realm_root(Realm::Shared, "");
    let action = Action::copy(file("shared://data/in").as_folder(), file("worker://in"));

    for kind in [BackendKind::Local, BackendKind::Staging] {
        let units = ResolverChain::for_backend(kind).resolve(&ctx, &[action.clone()]).unwrap();
        assert_eq!(commands(&units), vec!["cp data/in in"], "backend {kind}");
    }
}

#[test]
fn shared_root_is_joined_into_commands() {
    let ctx = ResolveContext::new().with_realm_root(Realm::Shared, "/scratch/project");
    let actions = [
        Action::copy(file("shared://data/in.pdb"), file("worker://in.pdb")),
        Action::MakeDir(file("shared://out/")),
    ];

    let units = ResolverChain::for_backend(BackendKind::Local).resolve(&ctx, &actions).unwrap();

    assert_eq!(
        commands(&units),
        vec![
            "cp /scratch/project/data/in.pdb in.pdb",
            "mkdir -p /scratch/project/out/",
        ]
    );
}

#[test]
fn unconfigured_realm_resolves_to_relative_path() {
    let ctx = ResolveContext::new();
    let action = Action::copy(file("shared://a.dcd"), file("worker://a.dcd"));

    let units = ResolverChain::for_backend(BackendKind::Local).resolve(&ctx, &[action]).unwrap();

    assert_eq!(commands(&units), vec!["cp a.dcd a.dcd"]);
}

#[test]
fn default_config_strips_every_realm_prefix() {
    let ctx = ConfigFile::default().resolve_context();
    let actions = [
        Action::copy(file("shared://data/in").as_folder(), file("worker://in")),
        Action::MakeDir(file("sandbox://scratch/")),
    ];

    let units = ResolverChain::for_backend(BackendKind::Local).resolve(&ctx, &actions).unwrap();

    assert_eq!(commands(&units), vec!["cp data/in in", "mkdir -p scratch/"]);
    assert!(commands(&units).iter().all(|cmd| !cmd.contains("://")));
}

#[test]
fn transfer_of_literal_file_is_staged() {
    let ctx = ResolveContext::new();
    let action = Action::transfer(file("file:///abs/x.pdb"), file("staging://x.pdb"));

    let units = ResolverChain::for_backend(BackendKind::Staging).resolve(&ctx, &[action]).unwrap();

    assert_eq!(
        units,
        vec![ResolvedUnit::Directive(StagingDirective {
            source: "/abs/x.pdb".to_string(),
            target: "staging://x.pdb".to_string(),
            action: "Transfer".to_string(),
        })]
    );
}

#[test]
fn stage_mode_copy_becomes_directive_only_on_staging_backend() {
    let ctx = ResolveContext::new();
    let action = Action::copy(file("staging://input.pdb"), file("worker://input.pdb"));

    let staged = ResolverChain::for_backend(BackendKind::Staging)
        .resolve(&ctx, &[action.clone()])
        .unwrap();
    let directive = staged[0].as_directive().unwrap();
    assert_eq!(directive.source, "staging://input.pdb");
    assert_eq!(directive.target, "input.pdb");
    assert_eq!(directive.action, "Copy");

    let local = ResolverChain::for_backend(BackendKind::Local)
        .resolve(&ctx, &[action])
        .unwrap();
    assert_eq!(commands(&local), vec!["cp input.pdb input.pdb"]);
}

#[test]
fn staging_area_location_is_canonicalized() {
    let ctx = ResolveContext::new().with_staging_area("sandbox:///workers/staging_area/");
    let action = Action::link(
        file("sandbox:///workers/staging_area/system.pdb"),
        file("worker://system.pdb"),
    );

    let units = ResolverChain::for_backend(BackendKind::Staging).resolve(&ctx, &[action]).unwrap();

    let directive = units[0].as_directive().unwrap();
    assert_eq!(directive.source, "staging://system.pdb");
    assert_eq!(directive.target, "system.pdb");
    assert_eq!(directive.action, "Link");
}

#[test]
fn literal_file_is_hard_linked_locally() {
    let ctx = ResolveContext::new();
    let actions = [
        Action::transfer(file("file:///abs/x.pdb"), file("worker://x.pdb")),
        Action::transfer(file("worker://out.dcd"), file("file:///results/out.dcd")),
    ];

    let units = ResolverChain::for_backend(BackendKind::Local).resolve(&ctx, &actions).unwrap();

    assert_eq!(
        commands(&units),
        vec!["ln /abs/x.pdb x.pdb", "ln -s out.dcd /results/out.dcd"]
    );
}

#[test]
fn local_links_follow_the_rule_table() {
    let ctx = ResolveContext::new();
    let chain = ResolverChain::for_backend(BackendKind::Local);

    let refused = [
        Action::copy(file("file:///abs/a.pdb"), file("worker://a.pdb")),
        Action::mv(file("worker://out.dcd"), file("file:///res/out.dcd")),
        Action::link(file("file:///abs/a"), file("shared://a")),
    ];
    for action in refused {
        let key = RuleKey {
            kind: action.kind(),
            source: action.source().unwrap().realm(),
            target: action.target().unwrap().realm(),
            is_folder: false,
        };
        assert_eq!(rules::lookup(key), StageMode::Unsupported);

        let err = chain.resolve_action(&ctx, &action).unwrap_err();
        assert!(
            matches!(err, ResolutionError::Unsupported { .. }),
            "{action} resolved to {err:?}"
        );
    }

    let listed = Action::transfer(file("file:///abs/x.pdb"), file("worker://x.pdb"));
    assert_eq!(
        commands(&chain.resolve_action(&ctx, &listed).unwrap()),
        vec!["ln /abs/x.pdb x.pdb"]
    );
}

#[test]
fn transfer_without_stager_has_no_shell_form() {
    let ctx = ResolveContext::new();
    let action = Action::transfer(file("staging://x.pdb"), file("worker://x.pdb"));

    let err = ResolverChain::for_backend(BackendKind::Local)
        .resolve(&ctx, &[action])
        .unwrap_err();

    assert_eq!(err, ResolutionError::NoShellForm { kind: ActionKind::Transfer });
}

#[test]
fn unsupported_combination_fails_closed() {
    let ctx = ResolveContext::new();
    let action = Action::link(file("worker://a"), file("shared://a"));

    for kind in [BackendKind::Local, BackendKind::Staging] {
        let err = ResolverChain::for_backend(kind)
            .resolve(&ctx, &[action.clone()])
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Unsupported {
                kind: ActionKind::Link,
                source_realm: Realm::Worker,
                target_realm: Realm::Shared,
                is_folder: false,
            }
        );
        assert!(err.to_string().contains("worker -> shared"));
    }
}

#[test]
fn failure_returns_no_partial_output() {
    let ctx = ResolveContext::new();
    let actions = [
        Action::Touch(file("worker://ok")),
        Action::mv(file("sandbox://a/"), file("shared://a/")),
    ];

    let result = ResolverChain::for_backend(BackendKind::Local).resolve(&ctx, &actions);

    assert!(matches!(result, Err(ResolutionError::Unsupported { .. })));
}

#[test]
fn non_transactions_become_shell_commands() {
    let ctx = ResolveContext::new();
    let actions = [
        Action::PathExport("/opt/md/bin".to_string()),
        Action::Remove(file("worker://tmp/")),
        Action::Remove(file("worker://log.txt")),
        Action::Touch(file("worker://.done")),
        Action::MakeDir(file("worker://traj/")),
    ];

    let units = ResolverChain::for_backend(BackendKind::Staging).resolve(&ctx, &actions).unwrap();

    assert_eq!(
        commands(&units),
        vec![
            "export PATH=/opt/md/bin:$PATH",
            "rm -r tmp/",
            "rm log.txt",
            "touch .done",
            "mkdir -p traj/",
        ]
    );
}

#[test]
fn empty_action_list_resolves_to_nothing() {
    let chain = ResolverChain::for_backend(BackendKind::Staging);
    assert!(chain.resolve(&ResolveContext::new(), &[]).unwrap().is_empty());
}

#[test]
fn action_nobody_accepts_is_unresolved() {
    let ctx = ResolveContext::new();
    let chain = ResolverChain::new().then(StageResolver);

    let err = chain
        .resolve(&ctx, &[Action::Touch(file("worker://x"))])
        .unwrap_err();

    assert!(matches!(err, ResolutionError::Unresolved { .. }));
    assert!(ResolverChain::new().resolve_action(&ctx, &Action::PathExport("/bin".into())).is_err());
}

#[test]
fn chain_order_decides_precedence() {
    let ctx = ResolveContext::new();
    let action = Action::copy(file("staging://a"), file("worker://a"));

    let bash_first = ResolverChain::new().then(BashResolver).then(StageResolver);
    let units = bash_first.resolve_action(&ctx, &action).unwrap();
    assert_eq!(commands(&units), vec!["cp staging://a a"]);

    assert_eq!(
        ResolverChain::for_backend(BackendKind::Local).names(),
        vec!["local-link", "bash"]
    );
    assert_eq!(
        ResolverChain::for_backend(BackendKind::Staging).names(),
        vec!["stage", "bash"]
    );
}
