//! Generic list page: load, create, update and delete one resource, with a
//! notification per outcome and a reload after every success.

use crate::environment::ConsoleEnvironment;
use crate::notification::Notification;
use checkin_api::{Id, MessageResult, OpResult, Resource};
use checkin_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use checkin_runtime::Store;
use std::marker::PhantomData;

/// State of a list page.
#[derive(Debug, Clone, PartialEq)]
pub struct CrudState<T> {
    /// Items from the last load
    pub items: Vec<T>,
    /// A load is in flight
    pub loading: bool,
    /// Notifications, oldest first
    pub notifications: Vec<Notification>,
}

impl<T> Default for CrudState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            notifications: Vec::new(),
        }
    }
}

impl<T> CrudState<T> {
    /// Most recent notification.
    #[must_use]
    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }
}

/// Actions of a list page.
#[derive(Debug, Clone)]
pub enum CrudAction<T> {
    /// Fetch the whole collection
    Load,
    /// Collection fetched
    Loaded(OpResult<Vec<T>>),
    /// Create an item (already validated)
    Create(T),
    /// Replace an item (already validated)
    Update(T),
    /// Delete by id
    Delete(Id),
    /// A write finished
    Completed(MessageResult),
}

/// Reducer for a list page of `T`.
pub struct CrudReducer<T> {
    _resource: PhantomData<fn() -> T>,
}

impl<T> CrudReducer<T> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<T> Default for CrudReducer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Store running a [`CrudReducer`].
pub type CrudStore<T> = Store<CrudState<T>, CrudAction<T>, ConsoleEnvironment, CrudReducer<T>>;

/// Effect fetching the collection of `T`.
pub fn load_effect<T: Resource>(env: &ConsoleEnvironment) -> Effect<CrudAction<T>> {
    let gateway = env.gateway.clone();
    Effect::future(async move { Some(CrudAction::Loaded(gateway.find_all::<T>().await)) })
}

impl<T: Resource> Reducer for CrudReducer<T> {
    type State = CrudState<T>;
    type Action = CrudAction<T>;
    type Environment = ConsoleEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CrudAction::Load => {
                state.loading = true;
                smallvec![load_effect(env)]
            },

            CrudAction::Loaded(result) => {
                state.loading = false;
                if !result.success {
                    tracing::warn!(resource = %T::KIND, "Load failed");
                    state
                        .notifications
                        .push(Notification::error(format!("Erro ao carregar {}s", T::KIND)));
                }
                state.items = result.data;
                smallvec![]
            },

            CrudAction::Create(item) => {
                let gateway = env.gateway.clone();
                smallvec![Effect::future(async move {
                    Some(CrudAction::Completed(gateway.create_one(&item).await))
                })]
            },

            CrudAction::Update(item) => {
                let gateway = env.gateway.clone();
                smallvec![Effect::future(async move {
                    Some(CrudAction::Completed(gateway.update(&item).await))
                })]
            },

            CrudAction::Delete(id) => {
                let gateway = env.gateway.clone();
                smallvec![Effect::future(async move {
                    Some(CrudAction::Completed(gateway.delete_by_id(id, T::KIND).await))
                })]
            },

            CrudAction::Completed(result) => {
                tracing::info!(resource = %T::KIND, success = result.success, "{}", result.message());
                state.notifications.push(Notification::from(&result));
                if result.success {
                    state.loading = true;
                    smallvec![load_effect(env)]
                } else {
                    smallvec![]
                }
            },
        }
    }
}
