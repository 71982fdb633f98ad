use std::sync::Arc;

use tokio::sync::watch;

use crate::models::user::PublicUser;

/// State that only changes through a pure reducer step.
pub trait Reducer: Clone + Send + Sync + 'static {
    type Action;

    fn reduce(&self, action: Self::Action) -> Self;
}

/// A cloneable handle over one piece of client state. Clones share the same
/// state; observers are notified after every dispatch.
pub struct Store<S: Reducer> {
    tx: Arc<watch::Sender<S>>,
}

impl<S: Reducer> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: Reducer + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Reducer> Store<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn dispatch(&self, action: S::Action) {
        self.tx.send_modify(|state| *state = state.reduce(action));
    }

    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    pub user: Option<PublicUser>,
    pub loading: bool,
    pub checking_auth: bool,
}

#[derive(Debug, Clone)]
pub enum UserAction {
    /// A signup or login request went out.
    Started,
    SignedIn(PublicUser),
    Failed,
    CheckingAuth,
    AuthChecked(Option<PublicUser>),
    LoggedOut,
}

impl Reducer for UserState {
    type Action = UserAction;

    fn reduce(&self, action: UserAction) -> Self {
        match action {
            UserAction::Started => Self {
                loading: true,
                ..self.clone()
            },
            UserAction::SignedIn(user) => Self {
                user: Some(user),
                loading: false,
                ..self.clone()
            },
            UserAction::Failed => Self {
                loading: false,
                ..self.clone()
            },
            UserAction::CheckingAuth => Self {
                checking_auth: true,
                ..self.clone()
            },
            UserAction::AuthChecked(user) => Self {
                user,
                checking_auth: false,
                ..self.clone()
            },
            UserAction::LoggedOut => Self::default(),
        }
    }
}

pub type UserStore = Store<UserState>;
