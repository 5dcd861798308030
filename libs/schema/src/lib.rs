//! Wire types shared by the dialog runtime: activities, cards, suggested
//! actions and the token-service payloads used during sign-in.

pub mod activity;
pub mod card;
pub mod channels;
pub mod token;

pub use activity::{
    Activity, ActivityType, ChannelAccount, ConversationAccount, ConversationReference, InputHint,
};
pub use card::{
    ActionType, Attachment, CardAction, HeroCard, OAuthCard, SigninCard, SuggestedActions,
};
pub use token::{
    InvokeResponse, ResourceResponse, SignInResource, TokenExchangeInvokeRequest,
    TokenExchangeInvokeResponse, TokenExchangeRequest, TokenExchangeResource, TokenResponse,
};
