use crate::infra::{
    seed_addons, seed_business_config, seed_companies, seed_coverages, seed_discount_rules,
    seed_slab_table, seed_thresholds, InMemoryClaimRepository, InMemoryNotificationPublisher,
    InMemoryPaymentRepository, InMemoryQuoteRepository,
};
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use std::sync::Arc;

use coverdesk::catalog::{
    Actor, ContextField, ContextValue, InsuranceType, QuoteContext, ThresholdTable,
};
use coverdesk::error::AppError;
use coverdesk::workflows::claims::{
    ClaimService, ClaimStatus, ClaimSubmission, TransitionRequest,
};
use coverdesk::workflows::payments::{PaymentService, SignatureVerifier, VerificationRequest};
use coverdesk::workflows::quotes::{
    BudgetRange, PremiumEngine, QuoteRequest, QuoteService, RiskProfile,
};

const DEMO_SECRET: &str = "sandbox-secret";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (YYYY-MM-DD, defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the claim portion of the demo.
    #[arg(long)]
    pub(crate) skip_claim: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Coverdesk end-to-end demo (evaluated {today})");

    let business_config = seed_business_config();
    let quote_repository = Arc::new(InMemoryQuoteRepository::default());
    let claim_repository = Arc::new(InMemoryClaimRepository::default());
    let payment_repository = Arc::new(InMemoryPaymentRepository::default());
    let notifier = Arc::new(InMemoryNotificationPublisher::default());

    let engine = PremiumEngine::new(
        seed_slab_table()?,
        seed_coverages(),
        seed_addons(),
        seed_discount_rules(),
        &business_config,
    );
    let quotes = QuoteService::new(
        quote_repository.clone(),
        notifier.clone(),
        engine,
        seed_companies(),
        &business_config,
    );
    let claims = ClaimService::new(
        claim_repository,
        notifier.clone(),
        ThresholdTable::new(seed_thresholds()),
        &business_config,
    );
    let verifier = SignatureVerifier::new(DEMO_SECRET);
    let payments = PaymentService::new(
        payment_repository,
        quote_repository,
        notifier.clone(),
        verifier.clone(),
    );

    let mut context = QuoteContext::new();
    context.insert(ContextField::ClaimFreeYears, ContextValue::Count(4));
    context.insert(ContextField::ActivePolicyCount, ContextValue::Count(2));

    let request = QuoteRequest {
        application_id: "APP-2026-0001".to_string(),
        insurance_type: InsuranceType::Motor,
        sum_insured: 1_000_000.0,
        requested_coverage_amount: 1_000_000.0,
        coverage_codes: vec!["PA".to_string(), "HOSP_CASH".to_string()],
        addon_codes: vec!["ZERO_DEP".to_string(), "ROADSIDE".to_string()],
        risk_profile: RiskProfile {
            age_score: 70.0,
            medical_score: 60.0,
            driving_score: 75.0,
            claim_history_score: 65.0,
        },
        annual_income: Some(1_200_000.0),
        budget: Some(BudgetRange {
            min: 30_000.0,
            max: 45_000.0,
        }),
        context,
    };

    println!("\nQuote generation");
    let generated = match quotes.generate(request, today) {
        Ok(generated) => generated,
        Err(err) => {
            println!("  Quote generation failed: {err}");
            return Ok(());
        }
    };
    for quote in &generated {
        println!(
            "- {} from {} | premium {:.2} | score {:.1} | valid until {}",
            quote.quote_number.0,
            quote.company.company_name,
            quote.breakdown.total_premium,
            quote.score.overall,
            quote.valid_until
        );
    }
    let Some(first) = generated.first() else {
        println!("  No insurer quotes produced");
        return Ok(());
    };
    let breakdown = &first.breakdown;
    println!(
        "  Breakdown: base {:.2} + coverages {:.2} + addons {:.2} -> risk {} ({:+.1}%) -> \
         discounts {:.2} -> net {:.2} + GST {:.2} = {:.2}",
        breakdown.base_premium,
        breakdown.coverage_premium,
        breakdown.addon_premium,
        breakdown.risk_category.label(),
        breakdown.risk_percentage,
        breakdown.total_discount,
        breakdown.net_premium,
        breakdown.gst_amount,
        breakdown.total_premium
    );

    let best = match quotes.compare("APP-2026-0001") {
        Ok(mut ranked) if !ranked.is_empty() => ranked.remove(0),
        Ok(_) => {
            println!("  No quotes available to accept");
            return Ok(());
        }
        Err(err) => {
            println!("  Quote comparison failed: {err}");
            return Ok(());
        }
    };
    let accepted = match quotes.accept(&best.quote_number, today) {
        Ok(accepted) => accepted,
        Err(err) => {
            println!("  Acceptance failed: {err}");
            return Ok(());
        }
    };
    println!(
        "  Accepted {} ({}); sibling quotes rejected",
        accepted.quote_number.0, accepted.company.company_code
    );

    println!("\nPayment and policy issuance");
    let payment = match payments.initiate(&accepted.quote_number.0, Utc::now()) {
        Ok(payment) => payment,
        Err(err) => {
            println!("  Payment initiation failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Order {} opened for {:.2}",
        payment.order_id.0, payment.amount
    );
    let signature = verifier.sign(&payment.order_id.0, "gw_demo_001");
    let policy = match payments.verify(
        VerificationRequest {
            order_id: payment.order_id.0.clone(),
            payment_id: "gw_demo_001".to_string(),
            signature,
        },
        Utc::now(),
    ) {
        Ok(policy) => policy,
        Err(err) => {
            println!("  Payment verification failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Policy {} issued against {} for {:.2}",
        policy.policy_number, policy.quote_number, policy.premium_paid
    );

    if args.skip_claim {
        render_notifications(&notifier);
        return Ok(());
    }

    println!("\nClaim lifecycle");
    let claim = match claims.submit(
        ClaimSubmission {
            policy_number: policy.policy_number.clone(),
            insurance_type: InsuranceType::Motor,
            claimant_id: "cust-2026-17".to_string(),
            description: "Rear bumper collision".to_string(),
            amount_requested: 82_000.0,
        },
        today,
    ) {
        Ok(claim) => claim,
        Err(err) => {
            println!("  Claim submission failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Registered {} for {:.2} ({})",
        claim.claim_number.0,
        claim.amount_requested,
        claim.status.label()
    );

    let admin = Actor::admin("adm-demo", "Demo Administrator");
    let steps: [(ClaimStatus, Option<f64>); 4] = [
        (ClaimStatus::UnderReview, None),
        (ClaimStatus::Approved, Some(78_000.0)),
        (ClaimStatus::Settled, None),
        (ClaimStatus::Closed, None),
    ];
    let mut current = claim;
    for (target, approved_amount) in steps {
        current = match claims.transition(
            &current.claim_number,
            TransitionRequest {
                target,
                actor: admin.clone(),
                reason: None,
                approved_amount,
            },
            Utc::now(),
        ) {
            Ok(next) => next,
            Err(err) => {
                println!("  Transition to {} failed: {err}", target.label());
                return Ok(());
            }
        };
        println!("- Moved to {}", current.status.label());
    }
    if let Some(settled) = current.amount_settled {
        println!("  Settled at {settled:.2}");
    }
    let sla = claims.sla_status(&current, today);
    println!(
        "  SLA: {} ({} of {} days used)",
        sla.state.label(),
        sla.days_elapsed,
        sla.sla_days
    );

    render_notifications(&notifier);
    Ok(())
}

fn render_notifications(notifier: &InMemoryNotificationPublisher) {
    let events = notifier.events();
    if events.is_empty() {
        println!("\nNotifications: none dispatched");
        return;
    }
    println!("\nNotifications");
    for event in events {
        println!("- template={} -> {}", event.template, event.reference);
    }
}
