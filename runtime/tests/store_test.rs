//! Store integration tests: effect feedback and concurrent sends.

use checkin_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use checkin_runtime::Store;

#[derive(Clone, Debug, Default)]
struct LoaderState {
    requests: u32,
    loaded: Vec<u32>,
}

#[derive(Clone, Debug)]
enum LoaderAction {
    Load,
    Loaded(u32),
    Burst,
}

struct LoaderReducer;

impl Reducer for LoaderReducer {
    type State = LoaderState;
    type Action = LoaderAction;
    type Environment = u32;

    fn reduce(
        &self,
        state: &mut LoaderState,
        action: LoaderAction,
        env: &u32,
    ) -> SmallVec<[Effect<LoaderAction>; 4]> {
        match action {
            LoaderAction::Load => {
                state.requests += 1;
                let value = *env;
                smallvec![Effect::future(async move { Some(LoaderAction::Loaded(value)) })]
            },
            LoaderAction::Loaded(value) => {
                state.loaded.push(value);
                SmallVec::new()
            },
            LoaderAction::Burst => smallvec![
                Effect::future(async { Some(LoaderAction::Loaded(1)) }),
                Effect::None,
                Effect::future(async { Some(LoaderAction::Loaded(2)) }),
                Effect::future(async { None }),
            ],
        }
    }
}

#[tokio::test]
async fn test_send_waits_for_feedback_actions() {
    let store = Store::new(LoaderState::default(), LoaderReducer, 42);

    store.send(LoaderAction::Load).await;

    let (requests, loaded) = store.state(|s| (s.requests, s.loaded.clone())).await;
    assert_eq!(requests, 1);
    assert_eq!(loaded, vec![42]);
}

#[tokio::test]
async fn test_every_effect_of_one_action_completes() {
    let store = Store::new(LoaderState::default(), LoaderReducer, 0);

    store.send(LoaderAction::Burst).await;

    let mut loaded = store.state(|s| s.loaded.clone()).await;
    loaded.sort_unstable();
    assert_eq!(loaded, vec![1, 2]);
}

#[tokio::test]
async fn test_concurrent_sends_race_independently() {
    let store = Store::new(LoaderState::default(), LoaderReducer, 5);

    let a = store.clone();
    let b = store.clone();
    tokio::join!(a.send(LoaderAction::Load), b.send(LoaderAction::Load));

    let (requests, loaded) = store.state(|s| (s.requests, s.loaded.len())).await;
    assert_eq!(requests, 2);
    assert_eq!(loaded, 2);
}
