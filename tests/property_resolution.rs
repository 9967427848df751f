// tests/property_resolution.rs

use proptest::prelude::*;
use stageflow::action::{Action, FileRef, Realm};
use stageflow::staging::{ResolveContext, ResolverChain};
use stageflow::types::BackendKind;

fn realm_strategy() -> impl Strategy<Value = Realm> {
    prop::sample::select(Realm::ALL.to_vec())
}

fn file_strategy() -> impl Strategy<Value = FileRef> {
    (realm_strategy(), "[a-z]{1,6}(\\.[a-z]{2,3})?", any::<bool>()).prop_map(
        |(realm, name, folder)| {
            let path = match (realm, folder) {
                (Realm::File, _) => format!("/abs/{name}"),
                (_, true) => format!("{name}/"),
                (_, false) => name,
            };
            FileRef::new(realm, path)
        },
    )
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (file_strategy(), file_strategy()).prop_map(|(s, t)| Action::copy(s, t)),
        (file_strategy(), file_strategy()).prop_map(|(s, t)| Action::mv(s, t)),
        (file_strategy(), file_strategy()).prop_map(|(s, t)| Action::link(s, t)),
        (file_strategy(), file_strategy()).prop_map(|(s, t)| Action::transfer(s, t)),
        file_strategy().prop_map(Action::Remove),
        file_strategy().prop_map(Action::Touch),
        file_strategy().prop_map(Action::MakeDir),
        "/[a-z]{1,8}".prop_map(Action::PathExport),
    ]
}

fn backend_strategy() -> impl Strategy<Value = BackendKind> {
    prop_oneof![Just(BackendKind::Local), Just(BackendKind::Staging)]
}

fn context() -> ResolveContext {
    ResolveContext::new()
        .with_staging_area("sandbox:///staging_area/")
        .with_realm_root(Realm::Shared, "/scratch/shared")
}

proptest! {
    #[test]
    fn resolution_is_deterministic(
        actions in prop::collection::vec(action_strategy(), 0..8),
        backend in backend_strategy(),
    ) {
        let ctx = context();
        let first = ResolverChain::for_backend(backend).resolve(&ctx, &actions);
        let second = ResolverChain::for_backend(backend).resolve(&ctx, &actions);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn list_resolution_is_ordered_concatenation(
        actions in prop::collection::vec(action_strategy(), 0..8),
        backend in backend_strategy(),
    ) {
        let ctx = context();
        let chain = ResolverChain::for_backend(backend);

        let individual: Result<Vec<_>, _> = actions
            .iter()
            .map(|a| chain.resolve_action(&ctx, a))
            .collect();
        let expected = individual.map(|parts| parts.into_iter().flatten().collect::<Vec<_>>());

        prop_assert_eq!(chain.resolve(&ctx, &actions), expected);
    }

    #[test]
    fn non_transactions_always_resolve(
        file in file_strategy(),
        backend in backend_strategy(),
    ) {
        let chain = ResolverChain::for_backend(backend);
        for action in [Action::Remove(file.clone()), Action::Touch(file.clone()), Action::MakeDir(file)] {
            let units = chain.resolve_action(&context(), &action).unwrap();
            prop_assert_eq!(units.len(), 1);
            prop_assert!(units[0].as_command().is_some());
        }
    }
}
