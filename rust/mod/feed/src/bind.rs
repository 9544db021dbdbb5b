//! Wires feed requests to a [`FeedViewModel`].

use std::sync::Arc;

use coolfeed_flux::Flux;

use crate::request::*;
use crate::viewmodel::FeedViewModel;

/// Register every feed request handler on `flux`.
///
/// `flux` should share the view-model's store so the shell reads what the
/// handlers publish.
pub fn register_handlers(flux: &Flux, vm: Arc<FeedViewModel>) {
    // feed/load
    {
        let vm = vm.clone();
        flux.on_typed::<LoadFeedReq, _, _>(LoadFeedReq::PATH, move |_, _| {
            let vm = vm.clone();
            async move { vm.fetch_feed_data().await }
        });
    }

    // feed/refresh
    {
        let vm = vm.clone();
        flux.on_typed::<RefreshReq, _, _>(RefreshReq::PATH, move |_, _| {
            let vm = vm.clone();
            async move { vm.refresh().await }
        });
    }

    // feed/load-more
    {
        let vm = vm.clone();
        flux.on_typed::<LoadMoreReq, _, _>(LoadMoreReq::PATH, move |_, _| {
            let vm = vm.clone();
            async move { vm.load_more().await }
        });
    }

    // feed/reload
    {
        let vm = vm.clone();
        flux.on_typed::<ReloadReq, _, _>(ReloadReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move { vm.reload(&req.id, req.is_view_reply).await }
        });
    }

    // feed/list-type
    {
        let vm = vm.clone();
        flux.on_typed::<SetListTypeReq, _, _>(SetListTypeReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move {
                vm.set_list_type(&req.list_type);
                vm.set_from_feed_author(req.from_feed_author);
                vm.refresh().await;
            }
        });
    }

    // feed/sheet/open
    {
        let vm = vm.clone();
        flux.on_typed::<OpenReplySheetReq, _, _>(OpenReplySheetReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move {
                vm.open_reply_sheet(&req.reply_id, &req.reply_uid, req.frid.as_deref())
                    .await
            }
        });
    }

    // feed/sheet/load-more
    {
        let vm = vm.clone();
        flux.on_typed::<LoadMoreReplyReq, _, _>(LoadMoreReplyReq::PATH, move |_, _| {
            let vm = vm.clone();
            async move { vm.load_more_reply().await }
        });
    }

    // feed/sheet/close
    {
        let vm = vm.clone();
        flux.on_typed::<CloseReplySheetReq, _, _>(CloseReplySheetReq::PATH, move |_, _| {
            let vm = vm.clone();
            async move { vm.reset_reply_state() }
        });
    }

    // feed/like
    {
        let vm = vm.clone();
        flux.on_typed::<LikeReq, _, _>(LikeReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move { vm.on_like_reply(&req.id, req.like, req.kind).await }
        });
    }

    // feed/delete
    {
        let vm = vm.clone();
        flux.on_typed::<DeleteReq, _, _>(DeleteReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move { vm.on_delete_reply(&req.id, req.kind).await }
        });
    }

    // feed/sheet/block
    {
        let vm = vm.clone();
        flux.on_typed::<BlockReplyUserReq, _, _>(BlockReplyUserReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move { vm.on_block_reply_user(&req.uid).await }
        });
    }

    // feed/block
    {
        let vm = vm.clone();
        flux.on_typed::<BlockUserReq, _, _>(BlockUserReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move { vm.block_user(&req.uid).await }
        });
    }

    // feed/owner/block
    {
        let vm = vm.clone();
        flux.on_typed::<ToggleBlockOwnerReq, _, _>(ToggleBlockOwnerReq::PATH, move |_, _| {
            let vm = vm.clone();
            async move { vm.toggle_block_owner().await }
        });
    }

    // feed/fav
    {
        let vm = vm.clone();
        flux.on_typed::<ToggleFavReq, _, _>(ToggleFavReq::PATH, move |_, _| {
            let vm = vm.clone();
            async move { vm.toggle_fav().await }
        });
    }

    // feed/reply/target
    {
        let vm = vm.clone();
        flux.on_typed::<SetReplyTargetReq, _, _>(SetReplyTargetReq::PATH, move |req, _| {
            let vm = vm.clone();
            async move { vm.set_reply_target(req.0.clone()) }
        });
    }

    // feed/reply/post
    flux.on_typed::<PostReplyReq, _, _>(PostReplyReq::PATH, move |req, _| {
        let vm = vm.clone();
        async move { vm.on_post_reply(&req.message, &req.captcha).await }
    });
}
